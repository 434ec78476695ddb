//! Run API Handlers
//!
//! HTTP endpoints for the run lifecycle.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use neuroscan_core::domain::log::LogEntry;
use neuroscan_core::dto::run::{CreateRun, RunSnapshot, RunSummary, SelectImage};
use neuroscan_pipeline::report::report_file_name;
use uuid::Uuid;

use crate::AppState;
use crate::api::error::ApiResult;
use crate::service::run_service;

/// POST /api/runs
/// Create a run for an image
pub async fn create_run(
    State(state): State<AppState>,
    Json(req): Json<CreateRun>,
) -> ApiResult<(StatusCode, Json<RunSnapshot>)> {
    tracing::info!("Creating run for {}", req.image_path.display());

    let snapshot = run_service::create_run(&state, req)?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /api/runs
/// List all runs
pub async fn list_runs(State(state): State<AppState>) -> Json<Vec<RunSummary>> {
    tracing::debug!("Listing runs");
    Json(run_service::list_runs(&state))
}

/// GET /api/runs/{id}
/// Get a run with its progress
pub async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RunSnapshot>> {
    tracing::debug!("Getting run: {}", id);
    Ok(Json(run_service::get_run(&state, id)?))
}

/// DELETE /api/runs/{id}
/// Delete a run that is not busy
pub async fn delete_run(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    tracing::info!("Deleting run: {}", id);

    run_service::delete_run(&state, id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/runs/{id}/start
pub async fn start_run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RunSnapshot>> {
    tracing::info!("Starting run: {}", id);
    Ok(Json(run_service::start_run(&state, id)?))
}

/// POST /api/runs/{id}/advance
/// Execute the next stage; returns once the stage finished
pub async fn advance_run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RunSnapshot>> {
    tracing::info!("Advancing run: {}", id);
    Ok(Json(run_service::advance_run(&state, id).await?))
}

/// POST /api/runs/{id}/reset
pub async fn reset_run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RunSnapshot>> {
    tracing::info!("Resetting run: {}", id);
    Ok(Json(run_service::reset_run(&state, id)?))
}

/// PUT /api/runs/{id}/image
pub async fn select_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectImage>,
) -> ApiResult<Json<RunSnapshot>> {
    tracing::info!("Selecting image {} for run {}", req.image_path.display(), id);
    Ok(Json(run_service::select_image(&state, id, req)?))
}

/// GET /api/runs/{id}/logs
pub async fn get_run_logs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<LogEntry>>> {
    tracing::debug!("Getting logs for run: {}", id);
    Ok(Json(run_service::run_logs(&state, id)?))
}

/// GET /api/runs/{id}/report
/// Download the final report of a completed run as a text file
pub async fn download_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    tracing::debug!("Downloading report for run: {}", id);

    let report = run_service::final_report(&state, id)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        report_file_name(chrono::Local::now())
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report,
    ))
}
