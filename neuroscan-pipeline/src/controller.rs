//! Pipeline controller
//!
//! Owns the ordered stage list and drives a caller-held [`PipelineRun`]
//! through `not_started -> running -> completed | failed`, one stage per
//! [`PipelineController::advance`] call. The run is passed in explicitly on
//! every call; the controller keeps no per-run state.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use neuroscan_core::PipelineError;
use neuroscan_core::domain::log::LogEntry;
use neuroscan_core::domain::progress::RunProgress;
use neuroscan_core::domain::run::{PipelineRun, RunStatus};
use neuroscan_core::domain::stage::{PipelineStage, StageId};

use crate::classifier::Classifier;
use crate::executor::{AgentSet, StageExecutor};
use crate::knowledge::TreatmentLookup;
use crate::log_buffer::LogBufferService;

/// What one successful `advance` produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceOutcome {
    pub stage_id: StageId,
    pub ordinal: usize,
    pub extracted_text: String,
    /// Treatment side-channel result, only after classification
    pub treatments: Option<String>,
    /// Whether this was the last stage
    pub completed: bool,
}

/// Sequential multi-agent pipeline controller
pub struct PipelineController {
    stages: Vec<PipelineStage>,
    executor: StageExecutor,
    classifier: Arc<dyn Classifier>,
    treatments: Arc<dyn TreatmentLookup>,
}

impl PipelineController {
    /// Creates a controller over `stages`
    ///
    /// Ordinals must be exactly `0..stages.len()` in list order, stage ids
    /// unique, and every stage bound to an agent.
    pub fn new(
        stages: Vec<PipelineStage>,
        agents: AgentSet,
        classifier: Arc<dyn Classifier>,
        treatments: Arc<dyn TreatmentLookup>,
    ) -> Result<Self, PipelineError> {
        if stages.is_empty() {
            return Err(PipelineError::InvalidStageDefinition(
                "a pipeline needs at least one stage".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (position, stage) in stages.iter().enumerate() {
            if stage.ordinal != position {
                return Err(PipelineError::InvalidStageDefinition(format!(
                    "stage '{}' is at position {} but has ordinal {}",
                    stage.stage_id, position, stage.ordinal
                )));
            }
            if !seen.insert(stage.stage_id) {
                return Err(PipelineError::InvalidStageDefinition(format!(
                    "stage '{}' appears more than once",
                    stage.stage_id
                )));
            }
            if !agents.contains(stage.stage_id) {
                return Err(PipelineError::InvalidStageDefinition(format!(
                    "no agent bound to stage '{}'",
                    stage.stage_id
                )));
            }
        }

        Ok(Self {
            stages,
            executor: StageExecutor::new(agents),
            classifier,
            treatments,
        })
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    pub fn treatment_lookup(&self) -> &Arc<dyn TreatmentLookup> {
        &self.treatments
    }

    /// Progress read-model of `run`
    pub fn progress(&self, run: &PipelineRun) -> RunProgress {
        RunProgress::of(run, &self.stages, Utc::now())
    }

    /// Transitions a run `not_started -> running`
    ///
    /// Every precondition is checked before the transition, so a rejected
    /// start leaves the run untouched and retryable.
    pub fn start(
        &self,
        run: &mut PipelineRun,
        log_buffer: &dyn LogBufferService,
    ) -> Result<(), PipelineError> {
        if run.status() != RunStatus::NotStarted {
            return Err(PipelineError::InvalidStateTransition(format!(
                "cannot start a run that is {}",
                run.status()
            )));
        }

        let image = match run.image_reference() {
            Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
            _ => {
                return Err(PipelineError::InvalidStateTransition(
                    "cannot start a run without an image".to_string(),
                ));
            }
        };

        if !image.is_file() {
            return Err(PipelineError::ImageNotFound(image));
        }

        if !self.classifier.is_available() {
            return Err(PipelineError::ResourceUnavailable(
                "the image classifier model is not loaded".to_string(),
            ));
        }

        run.begin(Utc::now())?;
        info!("Started run for {}", image.display());
        log_buffer.add_entry(LogEntry::info(
            None,
            format!("Starting analysis of {}", image.display()),
        ));
        Ok(())
    }

    /// Executes the stage at the run's current ordinal
    ///
    /// On success the extracted text is stored and the run moves on (or
    /// completes). On failure the run is marked failed at that stage, its
    /// ordinal and results are left as they were, and the failure is returned
    /// as [`PipelineError::AgentInvocation`].
    pub async fn advance(
        &self,
        run: &mut PipelineRun,
        log_buffer: &dyn LogBufferService,
    ) -> Result<AdvanceOutcome, PipelineError> {
        run.ensure_running("advance")?;

        let ordinal = run.current_ordinal();
        let stage = self.stages.get(ordinal).ok_or_else(|| {
            PipelineError::InvalidStateTransition(format!(
                "run is at ordinal {} but the pipeline has {} stages",
                ordinal,
                self.stages.len()
            ))
        })?;

        let outcome = self.executor.execute(stage, run, log_buffer).await;

        let extracted_text = match outcome.into_result() {
            Ok(text) => text,
            Err(failure) => {
                run.record_failure(stage, self.stages.len(), Utc::now())?;
                warn!("Run failed at stage '{}'", stage.stage_id);
                return Err(PipelineError::AgentInvocation {
                    stage_id: stage.stage_id,
                    message: failure.message,
                    trace: failure.trace,
                });
            }
        };

        let completed = run.record_success(
            stage,
            extracted_text.clone(),
            self.stages.len(),
            Utc::now(),
        )?;

        let treatments = if stage.stage_id == StageId::Classification {
            self.lookup_treatments(run, &extracted_text, log_buffer).await
        } else {
            None
        };

        if completed {
            info!("Run completed");
            log_buffer.add_entry(LogEntry::info(None, "Pipeline completed successfully"));
        }

        Ok(AdvanceOutcome {
            stage_id: stage.stage_id,
            ordinal,
            extracted_text,
            treatments,
            completed,
        })
    }

    /// Treatment side channel; failures are logged and swallowed
    async fn lookup_treatments(
        &self,
        run: &mut PipelineRun,
        classification: &str,
        log_buffer: &dyn LogBufferService,
    ) -> Option<String> {
        if classification.is_empty() {
            return None;
        }

        match self.treatments.treatments_for(classification).await {
            Ok(found) => {
                let joined = found.join("\n");
                if let Err(e) = run.record_treatments(joined.clone()) {
                    warn!("Could not record treatments: {}", e);
                    return None;
                }
                log_buffer.add_entry(LogEntry::info(
                    Some(StageId::Classification),
                    format!("Treatment lookup returned {} entries", found.len()),
                ));
                Some(joined)
            }
            Err(e) => {
                let err = PipelineError::from(e);
                warn!("{}", err);
                log_buffer.add_entry(LogEntry::warning(Some(StageId::Classification), err.to_string()));
                None
            }
        }
    }

    /// Returns the run to `not_started`, keeping its image; always legal
    pub fn reset(&self, run: &mut PipelineRun, log_buffer: &dyn LogBufferService) {
        run.reset();
        log_buffer.add_entry(LogEntry::info(None, "Run reset"));
    }

    /// Starts a run and advances it until it completes or a stage fails
    ///
    /// `on_stage` sees the run after each successful stage.
    pub async fn run_to_completion<F>(
        &self,
        run: &mut PipelineRun,
        log_buffer: &dyn LogBufferService,
        mut on_stage: F,
    ) -> Result<(), PipelineError>
    where
        F: FnMut(&PipelineRun, &AdvanceOutcome),
    {
        self.start(run, log_buffer)?;
        loop {
            let outcome = self.advance(run, log_buffer).await?;
            on_stage(run, &outcome);
            if outcome.completed {
                return Ok(());
            }
        }
    }
}
