//! Error types for the NeuroScan pipeline

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::stage::StageId;

/// Errors surfaced by the pipeline controller
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A backing model or service required to start is missing
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// The selected image does not resolve to a file
    #[error("Image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    /// The classifier failed on a valid image
    #[error("Prediction failed: {0}")]
    PredictionError(String),

    /// A stage agent failed; the run halted at that stage
    #[error("Stage '{stage_id}' failed: {message}")]
    AgentInvocation {
        stage_id: StageId,
        message: String,
        trace: String,
    },

    /// The caller misused the run state machine
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// The treatment side channel failed (never fatal for a run)
    #[error("Knowledge lookup failed: {0}")]
    LookupFailure(String),

    /// The stage list handed to the controller is malformed
    #[error("Invalid stage definition: {0}")]
    InvalidStageDefinition(String),

    /// Writing a report to disk failed
    #[error("Failed to export report: {0}")]
    Export(#[from] std::io::Error),
}

impl PipelineError {
    /// Stage the error belongs to, for stage failures
    pub fn stage_id(&self) -> Option<StageId> {
        match self {
            Self::AgentInvocation { stage_id, .. } => Some(*stage_id),
            _ => None,
        }
    }

    /// Full diagnostic trace, for stage failures
    pub fn trace(&self) -> Option<&str> {
        match self {
            Self::AgentInvocation { trace, .. } => Some(trace),
            _ => None,
        }
    }

    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidStateTransition(_))
    }
}

/// Errors from the image classifier adapter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifierError {
    /// The backing model was not loaded at process start
    #[error("Classifier model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("Prediction error: {0}")]
    PredictionError(String),
}

impl From<ClassifierError> for PipelineError {
    fn from(err: ClassifierError) -> Self {
        match err {
            ClassifierError::ModelUnavailable(msg) => PipelineError::ResourceUnavailable(msg),
            ClassifierError::ImageNotFound(path) => PipelineError::ImageNotFound(path),
            ClassifierError::PredictionError(msg) => PipelineError::PredictionError(msg),
        }
    }
}

/// Error from a treatment lookup backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LookupError {
    message: String,
}

impl LookupError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<LookupError> for PipelineError {
    fn from(err: LookupError) -> Self {
        PipelineError::LookupFailure(err.message)
    }
}
