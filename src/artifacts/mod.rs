//! Pre-trained Artifacts
//!
//! The scaler and model are black boxes behind two narrow traits: each
//! declares the ordered feature names it expects and exposes one numeric
//! operation. Backends:
//!
//! - `scaler`: scikit-learn StandardScaler / MinMaxScaler attribute export
//! - `xgboost`: XGBoost native JSON tree ensemble
//! - `linear`: linear regression coefficients
//!
//! Both artifacts are loaded once at startup and never mutated afterwards,
//! so the trait objects are shared across threads without locking.

pub mod linear;
pub mod scaler;
pub mod xgboost;

use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

pub use linear::LinearModel;
pub use scaler::{FittedScaler, ScalerKind};
pub use xgboost::TreeEnsemble;

/// Pre-fitted feature-wise transform
///
/// `transform` receives one row in `feature_names()` order and returns one
/// value per input column.
pub trait Transformer: Send + Sync {
    fn feature_names(&self) -> &[String];
    fn transform(&self, row: &[f64]) -> Vec<f64>;
}

/// Pre-trained single-output regression model
///
/// `predict` receives one row in `feature_names()` order.
pub trait Regressor: Send + Sync {
    fn feature_names(&self) -> &[String];
    fn predict(&self, row: &[f64]) -> f64;
}

/// Declared names must be non-empty and unique
pub(crate) fn check_feature_names(names: &[String]) -> Result<()> {
    if names.is_empty() {
        anyhow::bail!("Artifact declares no feature names");
    }
    let mut seen = FxHashSet::default();
    for name in names {
        if !seen.insert(name.as_str()) {
            anyhow::bail!("Duplicate feature name '{}'", name);
        }
    }
    Ok(())
}

/// Scaler + model pair, as loaded at startup
pub struct Artifacts {
    pub scaler: Box<dyn Transformer>,
    pub model: Box<dyn Regressor>,
}

impl Artifacts {
    /// Load both artifacts; any failure is fatal to startup
    pub fn load(scaler_path: &Path, model_path: &Path) -> Result<Self, PipelineError> {
        let scaler = FittedScaler::load(scaler_path).map_err(|e| load_failure(scaler_path, e))?;
        tracing::info!(
            "Loaded scaler {:?} ({:?}, {} features)",
            scaler_path,
            scaler.kind(),
            scaler.feature_names().len()
        );

        let model = load_regressor(model_path, scaler.feature_names()).map_err(|e| load_failure(model_path, e))?;
        tracing::info!("Loaded model {:?} ({} features)", model_path, model.feature_names().len());

        Ok(Self {
            scaler: Box::new(scaler),
            model,
        })
    }
}

fn load_failure(path: &Path, err: anyhow::Error) -> PipelineError {
    PipelineError::ArtifactLoad {
        path: PathBuf::from(path),
        reason: format!("{:#}", err),
    }
}

/// Load a model file, detecting the backend from its content
///
/// A model saved without feature names was fed positionally from the
/// scaler's output, so it inherits `fallback_names` when the widths agree.
pub fn load_regressor(path: &Path, fallback_names: &[String]) -> Result<Box<dyn Regressor>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read model file: {:?}", path))?;
    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse model JSON: {:?}", path))?;

    if value.get("learner").is_some() {
        finish_regressor(TreeEnsemble::from_value(value)?, path, fallback_names, TreeEnsemble::with_feature_names)
    } else if value.get("coef").is_some() || value.get("coef_").is_some() {
        finish_regressor(LinearModel::from_value(value)?, path, fallback_names, LinearModel::with_feature_names)
    } else {
        anyhow::bail!("Unrecognised model format (expected an XGBoost JSON model or linear coefficients)")
    }
}

/// Attach the scaler's order to an unnamed model, then validate its names
fn finish_regressor<M>(
    model: M,
    path: &Path,
    fallback_names: &[String],
    attach_names: fn(M, Vec<String>) -> Result<M>,
) -> Result<Box<dyn Regressor>>
where
    M: Regressor + 'static,
{
    let model = if model.feature_names().is_empty() {
        tracing::warn!(
            "Model {:?} declares no feature names; using the scaler's order ({} features)",
            path,
            fallback_names.len()
        );
        attach_names(model, fallback_names.to_vec())?
    } else {
        model
    };
    check_feature_names(model.feature_names())?;
    Ok(Box::new(model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_feature_names() {
        assert!(check_feature_names(&["a".to_string(), "b".to_string()]).is_ok());
        assert!(check_feature_names(&[]).is_err());
        assert!(check_feature_names(&["a".to_string(), "a".to_string()]).is_err());
    }

    fn write_model(file_name: &str, contents: &serde_json::Value) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}_{}", std::process::id(), file_name));
        std::fs::write(&path, contents.to_string()).unwrap();
        path
    }

    #[test]
    fn test_unnamed_models_inherit_scaler_order() {
        let fallback = vec!["x".to_string(), "y".to_string()];

        let linear = write_model("unnamed_linear.json", &json!({ "coef_": [1.0, 2.0], "intercept_": 0.5 }));
        let model = load_regressor(&linear, &fallback).unwrap();
        assert_eq!(model.feature_names(), fallback.as_slice());
        assert_eq!(model.predict(&[1.0, 1.0]), 3.5);

        let trees = write_model(
            "unnamed_trees.json",
            &json!({
                "learner": {
                    "gradient_booster": {
                        "name": "gbtree",
                        "model": { "trees": [{
                            "left_children": [1, -1, -1],
                            "right_children": [2, -1, -1],
                            "split_indices": [1, 0, 0],
                            "split_conditions": [0.0, -1.0, 1.0],
                            "default_left": [0, 0, 0]
                        }] }
                    },
                    "learner_model_param": { "base_score": "0", "num_feature": "2" },
                    "objective": { "name": "reg:squarederror" }
                }
            }),
        );
        let model = load_regressor(&trees, &fallback).unwrap();
        assert_eq!(model.feature_names(), fallback.as_slice());

        let too_narrow = load_regressor(&linear, &fallback[..1]);
        assert!(too_narrow.is_err());

        std::fs::remove_file(linear).ok();
        std::fs::remove_file(trees).ok();
    }

    #[test]
    fn test_missing_files_are_load_failures() {
        let err = Artifacts::load(Path::new("/nonexistent/scaler.json"), Path::new("/nonexistent/model.json"))
            .err()
            .expect("load should fail");
        match err {
            PipelineError::ArtifactLoad { path, reason } => {
                assert_eq!(path, PathBuf::from("/nonexistent/scaler.json"));
                assert!(reason.contains("Failed to read scaler file"));
            }
            other => panic!("expected ArtifactLoad, got {:?}", other),
        }
    }
}
