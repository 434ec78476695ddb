//! API Module
//!
//! HTTP API layer for the NeuroScan server.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod health;
pub mod knowledge;
pub mod run;
pub mod stage;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Stage catalogue
        .route("/api/stages", get(stage::list_stages))
        // Run endpoints
        .route("/api/runs", post(run::create_run).get(run::list_runs))
        .route("/api/runs/{id}", get(run::get_run).delete(run::delete_run))
        .route("/api/runs/{id}/start", post(run::start_run))
        .route("/api/runs/{id}/advance", post(run::advance_run))
        .route("/api/runs/{id}/reset", post(run::reset_run))
        .route("/api/runs/{id}/image", put(run::select_image))
        .route("/api/runs/{id}/logs", get(run::get_run_logs))
        .route("/api/runs/{id}/report", get(run::download_report))
        // Knowledge endpoints
        .route("/api/knowledge", get(knowledge::search_knowledge))
        .route("/api/treatments/{label}", get(knowledge::get_treatments))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
