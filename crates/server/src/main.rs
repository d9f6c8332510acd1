//! House Price Server - HTTP front end for the house price predictor
//!
//! Loads the trained artifact once at startup and serves predictions,
//! falling back to the closed-form estimate when no model is usable.

use anyhow::{Context, Result};
use house_price_server::{api, config::ServerConfig};
use predictor_lib::{
    artifact::ArtifactLoader,
    health::ServiceHealth,
    observability::StructuredLogger,
    predictor::HousePricePredictor,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting house-price-server");

    let config = ServerConfig::load()?;
    info!(
        artifact_path = %config.artifact_path,
        api_port = config.api_port,
        "Server configured"
    );

    let logger = StructuredLogger::new(&config.service_name);

    let outcome = ArtifactLoader::load(&config.artifact_path);
    let health = Arc::new(ServiceHealth::from_outcome(&outcome));
    match (outcome.artifact(), outcome.error()) {
        (Some(artifact), _) => logger.log_artifact_loaded(
            &config.artifact_path,
            artifact.metadata().model_name.as_deref(),
            artifact.feature_columns().len(),
        ),
        (None, Some(e)) => {
            logger.log_artifact_unavailable(&config.artifact_path, &e.to_string())
        }
        (None, None) => {}
    }

    let predictor = HousePricePredictor::from_outcome(outcome, config.predictor_config());
    logger.log_startup(SERVER_VERSION, predictor.artifact().is_some());

    let app_state = Arc::new(
        api::AppState::new(Arc::new(predictor), health.clone(), logger.clone())
            .with_page_size(config.history_page_size),
    );

    // Mark the service ready once the predictor exists
    health.set_ready(true);

    api::serve(config.api_port, app_state, shutdown_signal())
        .await
        .context("API server failed")?;

    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
