//! Run domain types
//!
//! A `PipelineRun` is one attempt to push a single image through the stage
//! sequence. Its fields are private: every mutation goes through a transition
//! method that checks the state machine, so the results/ordinal invariants hold
//! no matter which layer drives the run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::stage::{PipelineStage, StageContext, StageId, TREATMENTS_KEY};
use crate::error::PipelineError;

/// Run lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    NotStarted,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    /// Completed and failed runs only leave their state through a reset
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::NotStarted => write!(f, "not_started"),
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One keyed entry in the run results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    pub key: String,
    pub text: String,
}

/// Stage results in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageResults {
    entries: Vec<StageResult>,
}

impl StageResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.text.as_str())
    }

    pub fn stage(&self, id: StageId) -> Option<&str> {
        self.get(id.as_str())
    }

    /// Stage result, or empty text when that stage has not produced one
    pub fn stage_or_empty(&self, id: StageId) -> &str {
        self.stage(id).unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// Keys produced by stages, without the reserved side-channel key
    pub fn stage_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.keys().filter(|k| *k != TREATMENTS_KEY)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageResult> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts or replaces a result; a new key goes to the end
    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        let key = key.into();
        let text = text.into();
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.text = text,
            None => self.entries.push(StageResult { key, text }),
        }
    }
}

/// One end-to-end execution for one input image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    image_reference: Option<PathBuf>,
    current_ordinal: usize,
    results: StageResults,
    status: RunStatus,
    start_timestamp: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    final_report: Option<String>,
}

impl PipelineRun {
    /// Creates a fresh run for an image
    pub fn new(image_reference: impl Into<PathBuf>) -> Self {
        Self {
            image_reference: Some(image_reference.into()),
            ..Self::default()
        }
    }

    /// Points the run at an image
    ///
    /// A different image discards everything recorded so far and leaves a
    /// fresh run behind. Selecting the current image again is a no-op.
    ///
    /// # Returns
    /// `true` if the run was replaced
    pub fn select_image(&mut self, image_reference: impl Into<PathBuf>) -> bool {
        let image_reference = image_reference.into();
        if self.image_reference.as_deref() == Some(image_reference.as_path()) {
            return false;
        }
        *self = Self::new(image_reference);
        true
    }

    pub fn image_reference(&self) -> Option<&Path> {
        self.image_reference.as_deref()
    }

    pub fn current_ordinal(&self) -> usize {
        self.current_ordinal
    }

    pub fn results(&self) -> &StageResults {
        &self.results
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn start_timestamp(&self) -> Option<DateTime<Utc>> {
        self.start_timestamp
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn final_report(&self) -> Option<&str> {
        self.final_report.as_deref()
    }

    /// Ordinal of the stage that failed, if the run failed
    pub fn failed_ordinal(&self) -> Option<usize> {
        (self.status == RunStatus::Failed).then_some(self.current_ordinal)
    }

    /// View handed to input builders
    pub fn context(&self) -> StageContext<'_> {
        StageContext {
            image_reference: self.image_reference(),
            results: &self.results,
        }
    }

    /// Time since start, frozen once the run reaches a terminal state
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        let started = self.start_timestamp?;
        let end = self.finished_at.unwrap_or(now);
        Some(end.signed_duration_since(started))
    }

    /// Returns the run to its not-started defaults, keeping the selected image
    pub fn reset(&mut self) {
        let image_reference = self.image_reference.take();
        *self = Self {
            image_reference,
            ..Self::default()
        };
    }

    /// Transitions `not_started -> running`
    pub fn begin(&mut self, now: DateTime<Utc>) -> Result<(), PipelineError> {
        if self.status != RunStatus::NotStarted {
            return Err(PipelineError::InvalidStateTransition(format!(
                "cannot start a run that is {}",
                self.status
            )));
        }

        match self.image_reference.as_deref() {
            Some(path) if !path.as_os_str().is_empty() => {}
            _ => {
                return Err(PipelineError::InvalidStateTransition(
                    "cannot start a run without an image".to_string(),
                ));
            }
        }

        self.status = RunStatus::Running;
        self.current_ordinal = 0;
        self.start_timestamp = Some(now);
        Ok(())
    }

    /// Fails unless the run is running
    pub fn ensure_running(&self, action: &str) -> Result<(), PipelineError> {
        if self.status != RunStatus::Running {
            return Err(PipelineError::InvalidStateTransition(format!(
                "cannot {} while the run is {}",
                action, self.status
            )));
        }
        Ok(())
    }

    fn ensure_current(&self, stage: &PipelineStage, stage_count: usize) -> Result<(), PipelineError> {
        if stage.ordinal >= stage_count {
            return Err(PipelineError::InvalidStageDefinition(format!(
                "stage '{}' has ordinal {} but the pipeline has {} stages",
                stage.stage_id, stage.ordinal, stage_count
            )));
        }
        if stage.ordinal != self.current_ordinal {
            return Err(PipelineError::InvalidStateTransition(format!(
                "stage '{}' has ordinal {} but the run is at ordinal {}",
                stage.stage_id, stage.ordinal, self.current_ordinal
            )));
        }
        Ok(())
    }

    /// Stores a successful stage result and moves to the next ordinal
    ///
    /// # Returns
    /// `true` if this was the last stage and the run is now completed
    pub fn record_success(
        &mut self,
        stage: &PipelineStage,
        extracted_text: String,
        stage_count: usize,
        now: DateTime<Utc>,
    ) -> Result<bool, PipelineError> {
        self.ensure_running("record a stage result")?;
        self.ensure_current(stage, stage_count)?;

        self.results
            .insert(stage.stage_id.as_str(), extracted_text.as_str());
        self.current_ordinal += 1;

        if self.current_ordinal == stage_count {
            self.status = RunStatus::Completed;
            self.final_report = Some(extracted_text);
            self.finished_at = Some(now);
            return Ok(true);
        }

        Ok(false)
    }

    /// Marks the current stage as failed, freezing ordinal and results
    pub fn record_failure(
        &mut self,
        stage: &PipelineStage,
        stage_count: usize,
        now: DateTime<Utc>,
    ) -> Result<(), PipelineError> {
        self.ensure_running("record a stage failure")?;
        self.ensure_current(stage, stage_count)?;

        self.status = RunStatus::Failed;
        self.finished_at = Some(now);
        Ok(())
    }

    /// Stores the treatment side-channel result
    ///
    /// Only legal once the classification stage has a result.
    pub fn record_treatments(&mut self, treatments: String) -> Result<(), PipelineError> {
        if !self.results.contains_key(StageId::Classification.as_str()) {
            return Err(PipelineError::InvalidStateTransition(
                "treatments can only be recorded after classification".to_string(),
            ));
        }
        self.results.insert(TREATMENTS_KEY, treatments);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stage::StageInput;

    fn noop_input(_: &StageContext<'_>) -> StageInput {
        StageInput::new("", "")
    }

    fn stage(stage_id: StageId, ordinal: usize) -> PipelineStage {
        PipelineStage {
            stage_id,
            display_name: "Test",
            summary: "test",
            ordinal,
            input_builder: noop_input,
            result_keywords: &[],
        }
    }

    #[test]
    fn test_results_preserve_insertion_order() {
        let mut results = StageResults::new();
        results.insert("b", "1");
        results.insert("a", "2");
        results.insert("b", "3");

        let keys: Vec<&str> = results.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(results.get("b"), Some("3"));
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_stage_keys_skip_treatments() {
        let mut results = StageResults::new();
        results.insert("classification", "x");
        results.insert(TREATMENTS_KEY, "y");

        let keys: Vec<&str> = results.stage_keys().collect();
        assert_eq!(keys, vec!["classification"]);
    }

    #[test]
    fn test_begin_requires_not_started_and_image() {
        let mut run = PipelineRun::default();
        assert!(matches!(
            run.begin(Utc::now()),
            Err(PipelineError::InvalidStateTransition(_))
        ));
        assert_eq!(run.status(), RunStatus::NotStarted);

        let mut run = PipelineRun::new("scan.png");
        run.begin(Utc::now()).unwrap();
        assert_eq!(run.status(), RunStatus::Running);
        assert!(run.start_timestamp().is_some());

        assert!(matches!(
            run.begin(Utc::now()),
            Err(PipelineError::InvalidStateTransition(_))
        ));
    }

    #[test]
    fn test_record_success_completes_on_last_stage() {
        let stages = [stage(StageId::Classification, 0), stage(StageId::Report, 1)];
        let mut run = PipelineRun::new("scan.png");
        run.begin(Utc::now()).unwrap();

        assert!(!run.record_success(&stages[0], "a".into(), 2, Utc::now()).unwrap());
        assert_eq!(run.current_ordinal(), 1);
        assert_eq!(run.status(), RunStatus::Running);
        assert!(run.final_report().is_none());

        assert!(run.record_success(&stages[1], "b".into(), 2, Utc::now()).unwrap());
        assert_eq!(run.current_ordinal(), 2);
        assert_eq!(run.status(), RunStatus::Completed);
        assert_eq!(run.final_report(), Some("b"));
        assert!(run.finished_at().is_some());
    }

    #[test]
    fn test_record_success_rejects_out_of_order_stage() {
        let mut run = PipelineRun::new("scan.png");
        run.begin(Utc::now()).unwrap();

        let result = run.record_success(&stage(StageId::Report, 1), "x".into(), 2, Utc::now());
        assert!(matches!(result, Err(PipelineError::InvalidStateTransition(_))));
        assert!(run.results().is_empty());
        assert_eq!(run.current_ordinal(), 0);
    }

    #[test]
    fn test_record_failure_freezes_ordinal() {
        let stages = [stage(StageId::Classification, 0), stage(StageId::Report, 1)];
        let mut run = PipelineRun::new("scan.png");
        run.begin(Utc::now()).unwrap();
        run.record_success(&stages[0], "a".into(), 2, Utc::now())
            .unwrap();

        run.record_failure(&stages[1], 2, Utc::now()).unwrap();
        assert_eq!(run.status(), RunStatus::Failed);
        assert_eq!(run.current_ordinal(), 1);
        assert_eq!(run.failed_ordinal(), Some(1));
        assert!(!run.results().contains_key("report"));

        // Terminal: nothing else may be recorded
        assert!(run.record_success(&stages[1], "b".into(), 2, Utc::now()).is_err());
    }

    #[test]
    fn test_treatments_require_classification() {
        let mut run = PipelineRun::new("scan.png");
        run.begin(Utc::now()).unwrap();
        assert!(run.record_treatments("Surgery".into()).is_err());

        run.record_success(&stage(StageId::Classification, 0), "a".into(), 4, Utc::now())
            .unwrap();
        run.record_treatments("Surgery".into()).unwrap();
        assert_eq!(run.results().get(TREATMENTS_KEY), Some("Surgery"));
    }

    #[test]
    fn test_reset_matches_fresh_run() {
        let mut run = PipelineRun::new("scan.png");
        run.begin(Utc::now()).unwrap();
        run.record_success(&stage(StageId::Classification, 0), "a".into(), 4, Utc::now())
            .unwrap();

        run.reset();
        assert_eq!(run, PipelineRun::new("scan.png"));
    }

    #[test]
    fn test_select_image_discards_run_for_new_image() {
        let mut run = PipelineRun::new("a.png");
        run.begin(Utc::now()).unwrap();

        assert!(!run.select_image("a.png"));
        assert_eq!(run.status(), RunStatus::Running);

        assert!(run.select_image("b.png"));
        assert_eq!(run, PipelineRun::new("b.png"));
    }

    #[test]
    fn test_elapsed_freezes_after_finish() {
        let start = Utc::now();
        let mut run = PipelineRun::new("scan.png");
        assert!(run.elapsed(start).is_none());

        run.begin(start).unwrap();
        let finish = start + chrono::Duration::seconds(12);
        run.record_success(&stage(StageId::Report, 0), "r".into(), 1, finish)
            .unwrap();

        let later = finish + chrono::Duration::seconds(60);
        assert_eq!(run.elapsed(later), Some(chrono::Duration::seconds(12)));
    }
}
