// Axum server module
//
// Purpose: serve the prediction form on `/` (GET renders, POST predicts)
// The pipeline is built once at startup and shared read-only across requests.

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::artifacts::Artifacts;
use crate::config::ServerConfig;
use crate::error::PipelineError;
use crate::features::{InputMode, RawInput};
use crate::pipeline::YieldPipeline;
use crate::web::handlers::{render_page, PredictTemplate};

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<YieldPipeline>,
}

impl AppState {
    /// Load artifacts and build the pipeline; fails if either artifact is unusable
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        tracing::info!("Loading artifacts from {:?}...", config.artifact_dir);
        let artifacts = Artifacts::load(&config.scaler_path(), &config.model_path())?;

        let pipeline = YieldPipeline::new(artifacts, config.input_mode)?;
        tracing::info!(
            "Pipeline ready (mode: {}, scaler features: {}, model features: {})",
            pipeline.mode(),
            pipeline.scaler().expected_features().len(),
            pipeline.predictor().expected_features().len()
        );

        Ok(Self::from_pipeline(pipeline))
    }

    pub fn from_pipeline(pipeline: YieldPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(prediction_form).post(submit_prediction))
        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new()) // gzip + brotli compression
        .layer(TraceLayer::new_for_http()) // Request logging
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn prediction_form(State(state): State<AppState>) -> impl IntoResponse {
    render_page(&PredictTemplate::form(state.pipeline.mode()))
}

async fn submit_prediction(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let mode = state.pipeline.mode();
    let input = RawInput::from(form);

    let prediction = state
        .pipeline
        .predict(&input)
        .map_err(|error| AppError { mode, error })?;

    tracing::info!("Predicted yield {} kg/ha", prediction.kg_per_ha);
    let page = PredictTemplate::with_result(mode, prediction.to_string());
    Ok((StatusCode::OK, render_page(&page)).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Pipeline failure, rendered back into the form page
#[derive(Debug)]
struct AppError {
    mode: InputMode,
    error: PipelineError,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.error.is_input_error() {
            tracing::warn!("Rejected input: {}", self.error);
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            tracing::error!("Prediction failed: {}", self.error);
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let page = PredictTemplate::with_error(self.mode, &self.error.to_string());
        (status, render_page(&page)).into_response()
    }
}
