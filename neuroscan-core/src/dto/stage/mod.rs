//! Stage DTOs

use serde::{Deserialize, Serialize};

use crate::domain::stage::{PipelineStage, StageId};

/// Public description of a pipeline stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSummary {
    pub stage_id: StageId,
    pub display_name: String,
    pub summary: String,
    pub ordinal: usize,
    pub result_keywords: Vec<String>,
}

impl From<&PipelineStage> for StageSummary {
    fn from(stage: &PipelineStage) -> Self {
        Self {
            stage_id: stage.stage_id,
            display_name: stage.display_name.to_string(),
            summary: stage.summary.to_string(),
            ordinal: stage.ordinal,
            result_keywords: stage.result_keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}
