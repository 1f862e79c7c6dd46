use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rust_crop_eligibility::artifact_validator::verify_models_dir;
use rust_crop_eligibility::config::Config;
use rust_crop_eligibility::dataset::ReferenceDataset;
use rust_crop_eligibility::handlers::AppState;
use rust_crop_eligibility::router::app_router;
use rust_crop_eligibility::services::EligibilityService;

/// Main entry point for the application.
///
/// Loads configuration, verifies and loads the model artifacts, label
/// encoders and reference dataset, then starts the Axum server. Any load
/// failure aborts startup before the listener is bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_crop_eligibility=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Refuse to serve tampered artifacts
    verify_models_dir(&config.models_dir).context("model artifact verification failed")?;

    let eligibility = EligibilityService::load(&config).context("failed to load models")?;
    tracing::info!(
        "Eligibility service ready: {} models, {} label encoders",
        eligibility.models().len(),
        eligibility.encoders().len()
    );

    let dataset = ReferenceDataset::load(&config.dataset_path)
        .context("failed to load reference dataset")?;

    // Build application state
    let app_state = Arc::new(AppState {
        config: config.clone(),
        eligibility,
        dataset,
    });

    let app = app_router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
