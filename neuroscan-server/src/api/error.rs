//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use neuroscan_core::PipelineError;
use neuroscan_core::domain::stage::StageId;

use crate::service::run_service::RunError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    ServiceUnavailable(String),
    BadGateway(String),
    StageFailed {
        stage_id: StageId,
        message: String,
        trace: String,
    },
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, error_body(msg)),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, error_body(msg)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, error_body(msg)),
            ApiError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, error_body(msg))
            }
            ApiError::BadGateway(msg) => {
                tracing::error!("Upstream error: {}", msg);
                (StatusCode::BAD_GATEWAY, error_body(msg))
            }
            ApiError::StageFailed {
                stage_id,
                message,
                trace,
            } => {
                tracing::error!("Stage '{}' failed: {}", stage_id, message);
                (
                    StatusCode::BAD_GATEWAY,
                    serde_json::json!({
                        "error": message,
                        "stage_id": stage_id,
                        "trace": trace,
                    }),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, error_body(msg))
            }
        };

        (status, Json(body)).into_response()
    }
}

fn error_body(message: String) -> serde_json::Value {
    serde_json::json!({ "error": message })
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidStateTransition(msg) => ApiError::Conflict(msg),
            PipelineError::ResourceUnavailable(msg) => ApiError::ServiceUnavailable(msg),
            PipelineError::ImageNotFound(path) => {
                ApiError::NotFound(format!("Image not found: {}", path.display()))
            }
            PipelineError::AgentInvocation {
                stage_id,
                message,
                trace,
            } => ApiError::StageFailed {
                stage_id,
                message,
                trace,
            },
            err @ (PipelineError::PredictionError(_) | PipelineError::LookupFailure(_)) => {
                ApiError::BadGateway(err.to_string())
            }
            err @ (PipelineError::InvalidStageDefinition(_) | PipelineError::Export(_)) => {
                ApiError::InternalError(err.to_string())
            }
        }
    }
}

impl From<RunError> for ApiError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::NotFound(id) => ApiError::NotFound(format!("Run {} not found", id)),
            RunError::ValidationError(msg) => ApiError::BadRequest(msg),
            RunError::Pipeline(err) => err.into(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
