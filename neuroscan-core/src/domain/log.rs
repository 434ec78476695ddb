//! Log domain types

use serde::{Deserialize, Serialize};

use super::stage::StageId;

/// A diagnostic log entry recorded while a run executes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: LogLevel,
    /// Stage that produced the entry, if any
    pub stage: Option<StageId>,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, stage: Option<StageId>, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            level,
            stage,
            message: message.into(),
        }
    }

    pub fn debug(stage: Option<StageId>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Debug, stage, message)
    }

    pub fn info(stage: Option<StageId>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, stage, message)
    }

    pub fn warning(stage: Option<StageId>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, stage, message)
    }

    pub fn error(stage: Option<StageId>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, stage, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}
