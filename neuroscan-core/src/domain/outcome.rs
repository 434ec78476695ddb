//! Agent outcome domain types

use serde::{Deserialize, Serialize};

/// Why a stage attempt failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentFailure {
    /// Human-readable message
    pub message: String,
    /// Full diagnostic trace (cause chain, backtrace when captured)
    pub trace: String,
}

/// Result of one stage execution attempt
///
/// Produced by the stage executor and consumed by the controller. Only the
/// extracted text of a successful outcome is ever copied into a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutcome {
    pub raw_text: String,
    pub extracted_text: String,
    pub error: Option<AgentFailure>,
}

impl AgentOutcome {
    pub fn success(raw_text: impl Into<String>, extracted_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            extracted_text: extracted_text.into(),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            raw_text: String::new(),
            extracted_text: String::new(),
            error: Some(AgentFailure {
                message: message.into(),
                trace: trace.into(),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Splits the outcome into the extracted text or the failure
    pub fn into_result(self) -> Result<String, AgentFailure> {
        match self.error {
            None => Ok(self.extracted_text),
            Some(failure) => Err(failure),
        }
    }
}
