//! Stage API Handlers

use axum::{Json, extract::State};
use neuroscan_core::dto::stage::StageSummary;

use crate::AppState;

/// GET /api/stages
/// List the pipeline stages in execution order
pub async fn list_stages(State(state): State<AppState>) -> Json<Vec<StageSummary>> {
    tracing::debug!("Listing stages");

    Json(
        state
            .controller
            .stages()
            .iter()
            .map(StageSummary::from)
            .collect(),
    )
}
