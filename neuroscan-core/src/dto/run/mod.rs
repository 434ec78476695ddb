//! Run DTOs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::domain::progress::RunProgress;
use crate::domain::run::{PipelineRun, RunStatus};
use crate::domain::stage::StageId;

/// Request to create a run for an image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRun {
    pub image_path: PathBuf,
}

/// Request to point an existing run at an image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectImage {
    pub image_path: PathBuf,
}

/// Last stage failure of a run, kept for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFailure {
    pub stage_id: StageId,
    pub message: String,
    pub trace: String,
}

/// Full view of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub id: Uuid,
    pub run: PipelineRun,
    pub progress: RunProgress,
    pub last_error: Option<RunFailure>,
}

/// One line of a run listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: Uuid,
    pub status: RunStatus,
    pub current_ordinal: usize,
    pub image_reference: Option<PathBuf>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl RunSummary {
    pub fn of(id: Uuid, run: &PipelineRun) -> Self {
        Self {
            id,
            status: run.status(),
            current_ordinal: run.current_ordinal(),
            image_reference: run.image_reference().map(|p| p.to_path_buf()),
            started_at: run.start_timestamp(),
        }
    }
}
