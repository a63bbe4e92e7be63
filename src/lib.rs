//! Crop Yield Predictor
//!
//! Turns agronomic form input (year, state, crop, season, soil and weather
//! measurements) into a yield estimate in kg/ha using a pre-fitted scaler and
//! a pre-trained regression model.
//!
//! Pipeline, per request:
//! - `features/`: raw record → 15 named features (category encoding, Decade
//!   derivation, assisted-mode defaults)
//! - `artifacts/`: scaler and model backends behind `Transformer` / `Regressor`
//! - `pipeline`: name-reconciling adapters and the end-to-end run
//!
//! The `api` feature adds the axum form server (`api_server`, `web/`).

pub mod artifacts;
pub mod config;
pub mod encoding;
pub mod error;
pub mod features;
pub mod pipeline;

#[cfg(feature = "api")]
pub mod api_server;
#[cfg(feature = "api")]
pub mod web;

// Re-export commonly used types
pub use artifacts::{Artifacts, FittedScaler, LinearModel, Regressor, Transformer, TreeEnsemble};
pub use config::ServerConfig;
pub use encoding::CategoryKind;
pub use error::{PipelineError, Stage};
pub use features::{assemble, decade_of, Feature, FeatureVector, InputMode, RawInput, RawValue};
pub use pipeline::{Prediction, YieldPipeline};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
