use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use neuroscan_pipeline::PipelineConfig;
use neuroscan_pipeline::setup::build_controller;

pub mod api;
pub mod repository;
pub mod service;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<neuroscan_pipeline::PipelineController>,
    pub runs: Arc<repository::RunRepository>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neuroscan_server=info,neuroscan_pipeline=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting NeuroScan server...");

    let config = PipelineConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from environment: {}", e);
        tracing::info!("Using default configuration");
        PipelineConfig::default()
    });
    config.validate().context("Invalid configuration")?;

    // The classifier model is probed once here; runs cannot start without it
    let controller = build_controller(&config).await?;
    if !controller.classifier().is_available() {
        tracing::warn!("Classifier model unavailable; runs will be rejected at start");
    }

    let state = AppState {
        controller: Arc::new(controller),
        runs: Arc::new(repository::RunRepository::new()),
    };

    // Build router with all API endpoints
    let app = api::create_router(state);

    let addr = std::env::var("NEUROSCAN_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
