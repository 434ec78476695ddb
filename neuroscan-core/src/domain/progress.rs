//! Progress read-model
//!
//! Pure projections of a `PipelineRun` used by progress displays. Nothing here
//! mutates the run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::run::{PipelineRun, RunStatus};
use super::stage::{PipelineStage, StageId};

/// Display state of a single stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Per-stage line of a progress display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageProgress {
    pub stage_id: StageId,
    pub display_name: String,
    pub summary: String,
    pub ordinal: usize,
    pub state: StageState,
    /// Extracted result, once the stage completed
    pub result: Option<String>,
}

/// Snapshot of how far a run got
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunProgress {
    pub status: RunStatus,
    pub stage_count: usize,
    pub current_ordinal: usize,
    /// Completed share of the pipeline, in [0, 1]
    pub fraction: f64,
    /// 1-based step shown to users, capped at the stage count
    pub display_step: usize,
    pub elapsed_seconds: Option<i64>,
    pub failed_stage: Option<StageId>,
    pub stages: Vec<StageProgress>,
}

impl RunProgress {
    pub fn of(run: &PipelineRun, stages: &[PipelineStage], now: DateTime<Utc>) -> Self {
        let stage_count = stages.len();
        let current = run.current_ordinal();

        let stages_progress = stages
            .iter()
            .map(|stage| StageProgress {
                stage_id: stage.stage_id,
                display_name: stage.display_name.to_string(),
                summary: stage.summary.to_string(),
                ordinal: stage.ordinal,
                state: stage_state(run, stage.ordinal),
                result: run.results().stage(stage.stage_id).map(str::to_string),
            })
            .collect();

        let fraction = if stage_count == 0 {
            0.0
        } else {
            current as f64 / stage_count as f64
        };

        Self {
            status: run.status(),
            stage_count,
            current_ordinal: current,
            fraction,
            display_step: (current + 1).min(stage_count),
            elapsed_seconds: run.elapsed(now).map(|d| d.num_seconds()),
            failed_stage: run
                .failed_ordinal()
                .and_then(|ordinal| stages.get(ordinal))
                .map(|stage| stage.stage_id),
            stages: stages_progress,
        }
    }
}

fn stage_state(run: &PipelineRun, ordinal: usize) -> StageState {
    let current = run.current_ordinal();
    if ordinal < current {
        return StageState::Completed;
    }
    if ordinal > current {
        return StageState::Pending;
    }
    match run.status() {
        RunStatus::Running => StageState::Running,
        RunStatus::Failed => StageState::Failed,
        RunStatus::NotStarted | RunStatus::Completed => StageState::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stage::{StageContext, StageInput};

    fn noop_input(_: &StageContext<'_>) -> StageInput {
        StageInput::new("", "")
    }

    fn stages() -> Vec<PipelineStage> {
        StageId::ALL
            .into_iter()
            .enumerate()
            .map(|(ordinal, stage_id)| PipelineStage {
                stage_id,
                display_name: "Stage",
                summary: "does things",
                ordinal,
                input_builder: noop_input,
                result_keywords: &[],
            })
            .collect()
    }

    #[test]
    fn test_progress_of_fresh_run() {
        let run = PipelineRun::new("scan.png");
        let progress = RunProgress::of(&run, &stages(), Utc::now());

        assert_eq!(progress.fraction, 0.0);
        assert_eq!(progress.display_step, 1);
        assert!(progress.elapsed_seconds.is_none());
        assert!(progress
            .stages
            .iter()
            .all(|s| s.state == StageState::Pending));
    }

    #[test]
    fn test_progress_marks_running_and_failed_stage() {
        let stages = stages();
        let mut run = PipelineRun::new("scan.png");
        run.begin(Utc::now()).unwrap();
        run.record_success(&stages[0], "Diagnosis: x".into(), 4, Utc::now())
            .unwrap();

        let progress = RunProgress::of(&run, &stages, Utc::now());
        assert_eq!(progress.stages[0].state, StageState::Completed);
        assert_eq!(progress.stages[0].result.as_deref(), Some("Diagnosis: x"));
        assert_eq!(progress.stages[1].state, StageState::Running);
        assert_eq!(progress.stages[2].state, StageState::Pending);
        assert_eq!(progress.fraction, 0.25);
        assert_eq!(progress.display_step, 2);

        run.record_failure(&stages[1], 4, Utc::now()).unwrap();
        let progress = RunProgress::of(&run, &stages, Utc::now());
        assert_eq!(progress.stages[1].state, StageState::Failed);
        assert_eq!(progress.failed_stage, Some(StageId::ClinicalAnalysis));
    }

    #[test]
    fn test_display_step_is_capped_when_completed() {
        let stages = stages();
        let mut run = PipelineRun::new("scan.png");
        run.begin(Utc::now()).unwrap();
        for stage in &stages {
            run.record_success(stage, "ok".into(), 4, Utc::now()).unwrap();
        }

        let progress = RunProgress::of(&run, &stages, Utc::now());
        assert_eq!(progress.display_step, 4);
        assert_eq!(progress.fraction, 1.0);
        assert!(progress
            .stages
            .iter()
            .all(|s| s.state == StageState::Completed));
    }
}
