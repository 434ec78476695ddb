//! Knowledge API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use neuroscan_core::dto::knowledge::{KnowledgeResponse, TreatmentsResponse};
use serde::Deserialize;

use crate::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::knowledge_service;

#[derive(Debug, Deserialize)]
pub struct KnowledgeQuery {
    #[serde(default)]
    pub query: String,
}

/// GET /api/knowledge?query=
/// Search the medical knowledge base
pub async fn search_knowledge(Query(params): Query<KnowledgeQuery>) -> Json<KnowledgeResponse> {
    tracing::debug!("Knowledge query: {}", params.query);
    Json(knowledge_service::search(&params.query))
}

/// GET /api/treatments/{label}
/// Look up the treatments linked to a diagnosis
pub async fn get_treatments(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> ApiResult<Json<TreatmentsResponse>> {
    tracing::debug!("Treatment lookup: {}", label);

    let response = knowledge_service::treatments(&state, &label)
        .await
        .map_err(|e| ApiError::BadGateway(format!("Knowledge lookup failed: {}", e)))?;

    Ok(Json(response))
}
