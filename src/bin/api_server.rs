// API Server Binary Entry Point
//
// Purpose: Start the Axum form server with the scaler + model loaded once
// Usage: cargo run --bin api_server

use crop_yield_predictor::{create_router, AppState, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "crop_yield_predictor=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting crop yield server...");

    let config = ServerConfig::from_env()?;

    tracing::info!("Configuration:");
    tracing::info!("  ARTIFACT_DIR: {:?}", config.artifact_dir);
    tracing::info!("  SCALER_FILE: {}", config.scaler_file);
    tracing::info!("  MODEL_FILE: {}", config.model_file);
    tracing::info!("  INPUT_MODE: {}", config.input_mode);
    tracing::info!("  PORT: {}", config.port);

    // Artifact load failures abort startup here
    let state = AppState::new(&config)?;

    let app = create_router(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await?;

    Ok(())
}
