//! Pipeline Errors
//!
//! Every failure a prediction request can hit, plus the startup-only
//! artifact load failure. Request-level variants are rendered back to the
//! user by the web layer; `ArtifactLoad` aborts startup.

use smallvec::SmallVec;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::encoding::CategoryKind;

/// Stage of the pipeline that owns an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Scaler,
    Predictor,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Scaler => write!(f, "scaler"),
            Stage::Predictor => write!(f, "model"),
        }
    }
}

/// Feature names an artifact expects but the vector does not carry
pub type MissingFeatures = SmallVec<[String; 4]>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Label absent from the corresponding category map
    #[error("unknown {kind} '{label}'")]
    UnknownCategory { kind: CategoryKind, label: String },

    /// Required raw input absent (or blank)
    #[error("missing field '{field}'")]
    MissingField { field: String },

    /// Value present but not a finite number
    #[error("invalid numeric value '{value}' for field '{field}'")]
    InvalidNumeric { field: String, value: String },

    /// Vector does not carry every feature the artifact declares
    #[error("{stage} expects features not present in the input: {}", .missing.join(", "))]
    SchemaMismatch { stage: Stage, missing: MissingFeatures },

    /// Artifact declares an unusable feature list (empty or duplicated names)
    #[error("{stage} artifact is unusable: {reason}")]
    InvalidArtifact { stage: Stage, reason: String },

    /// Artifact produced output of the wrong shape or a non-finite value
    #[error("{stage} inference failed: {reason}")]
    Inference { stage: Stage, reason: String },

    /// Scaler or model could not be loaded at startup
    #[error("failed to load artifact {}: {reason}", .path.display())]
    ArtifactLoad { path: PathBuf, reason: String },
}

impl PipelineError {
    /// True for errors caused by the caller's input rather than the artifacts
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PipelineError::UnknownCategory { .. }
                | PipelineError::MissingField { .. }
                | PipelineError::InvalidNumeric { .. }
        )
    }

    pub(crate) fn missing(field: &str) -> Self {
        PipelineError::MissingField { field: field.to_string() }
    }

    pub(crate) fn invalid(field: &str, value: &str) -> Self {
        PipelineError::InvalidNumeric {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}
