//! Yield Prediction Pipeline
//!
//! Raw record → Assemble → Scale → Predict, synchronously and statelessly.
//! Nothing is cached between runs; the only shared state is the pair of
//! read-only artifacts.
//!
//! Both adapters reconcile columns by name against the artifact's declared
//! feature order before calling it, so the internal order of a vector never
//! reaches the transform or the model.

use std::fmt;

use crate::artifacts::{check_feature_names, Artifacts, Regressor, Transformer};
use crate::error::{PipelineError, Stage};
use crate::features::{assemble, FeatureVector, InputMode, RawInput};

// ============================================================================
// Prediction
// ============================================================================

/// Model output in kg/ha
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Unrounded model output
    pub raw: f64,
    /// Rounded to 2 decimals for display
    pub kg_per_ha: f64,
}

impl Prediction {
    pub fn new(raw: f64) -> Self {
        Self {
            raw,
            kg_per_ha: round2(raw),
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicted Yield: {} kg/ha", format_yield(self.kg_per_ha))
    }
}

/// Magnitude from which an f64 carries no fractional digits worth rounding
const ROUNDING_LIMIT: f64 = 1e15;

/// Round half away from zero to 2 decimal places
///
/// Values at or beyond `ROUNDING_LIMIT` are returned unchanged; scaling them
/// by 100 could overflow to infinity.
pub fn round2(value: f64) -> f64 {
    let shifted = value * 100.0;
    if !shifted.is_finite() || value.abs() >= ROUNDING_LIMIT {
        return value;
    }
    shifted.round() / 100.0
}

/// Shortest decimal form, always with a fractional part (`3.0`, `1234.57`)
pub fn format_yield(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

// ============================================================================
// Adapters
// ============================================================================

/// Feeds the scaler exactly the columns it declares, in its order
pub struct ScalerAdapter {
    inner: Box<dyn Transformer>,
}

impl ScalerAdapter {
    /// Fails if the scaler declares no feature names or repeats one
    pub fn new(inner: Box<dyn Transformer>) -> Result<Self, PipelineError> {
        validate_names(inner.feature_names(), Stage::Scaler)?;
        Ok(Self { inner })
    }

    pub fn expected_features(&self) -> &[String] {
        self.inner.feature_names()
    }

    /// Scaled vector, named and ordered as the scaler declares
    pub fn apply(&self, features: &FeatureVector) -> Result<FeatureVector, PipelineError> {
        let names = self.inner.feature_names();
        let row = features.select(names, Stage::Scaler)?;
        let scaled = self.inner.transform(&row);

        if scaled.len() != names.len() {
            return Err(PipelineError::Inference {
                stage: Stage::Scaler,
                reason: format!("returned {} values for {} features", scaled.len(), names.len()),
            });
        }
        if let Some(idx) = scaled.iter().position(|v| !v.is_finite()) {
            // Finite input that overflows the transform is out of range for the caller
            if row[idx].is_finite() {
                return Err(PipelineError::invalid(&names[idx], &row[idx].to_string()));
            }
            return Err(PipelineError::Inference {
                stage: Stage::Scaler,
                reason: format!("non-finite output for '{}'", names[idx]),
            });
        }

        Ok(FeatureVector::from_columns(names, scaled))
    }
}

/// Feeds the model exactly the columns it declares, in its order
pub struct PredictorAdapter {
    inner: Box<dyn Regressor>,
}

impl PredictorAdapter {
    /// Fails if the model declares no feature names or repeats one
    pub fn new(inner: Box<dyn Regressor>) -> Result<Self, PipelineError> {
        validate_names(inner.feature_names(), Stage::Predictor)?;
        Ok(Self { inner })
    }

    pub fn expected_features(&self) -> &[String] {
        self.inner.feature_names()
    }

    pub fn apply(&self, scaled: &FeatureVector) -> Result<Prediction, PipelineError> {
        let row = scaled.select(self.inner.feature_names(), Stage::Predictor)?;
        let raw = self.inner.predict(&row);

        if !raw.is_finite() {
            return Err(PipelineError::Inference {
                stage: Stage::Predictor,
                reason: format!("non-finite prediction {}", raw),
            });
        }
        Ok(Prediction::new(raw))
    }
}

fn validate_names(names: &[String], stage: Stage) -> Result<(), PipelineError> {
    check_feature_names(names).map_err(|e| PipelineError::InvalidArtifact {
        stage,
        reason: e.to_string(),
    })
}

// ============================================================================
// Pipeline
// ============================================================================

/// Immutable, process-wide pipeline; share it behind an `Arc`
pub struct YieldPipeline {
    mode: InputMode,
    scaler: ScalerAdapter,
    predictor: PredictorAdapter,
}

impl YieldPipeline {
    pub fn new(artifacts: Artifacts, mode: InputMode) -> Result<Self, PipelineError> {
        Self::from_parts(artifacts.scaler, artifacts.model, mode)
    }

    pub fn from_parts(
        scaler: Box<dyn Transformer>,
        model: Box<dyn Regressor>,
        mode: InputMode,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            mode,
            scaler: ScalerAdapter::new(scaler)?,
            predictor: PredictorAdapter::new(model)?,
        })
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn scaler(&self) -> &ScalerAdapter {
        &self.scaler
    }

    pub fn predictor(&self) -> &PredictorAdapter {
        &self.predictor
    }

    /// Full run: raw record → rounded prediction
    pub fn predict(&self, input: &RawInput) -> Result<Prediction, PipelineError> {
        let span = tracing::debug_span!("predict", mode = %self.mode, fields = input.len());
        let _enter = span.enter();

        let features = assemble(input, self.mode)?;
        let prediction = self.predict_features(&features)?;

        tracing::debug!("Predicted {} kg/ha (raw {})", prediction.kg_per_ha, prediction.raw);
        Ok(prediction)
    }

    /// Scale + predict an already assembled vector
    pub fn predict_features(&self, features: &FeatureVector) -> Result<Prediction, PipelineError> {
        let scaled = self.scaler.apply(features)?;
        self.predictor.apply(&scaled)
    }
}
