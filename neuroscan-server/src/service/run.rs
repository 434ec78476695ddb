//! Run Service
//!
//! Business logic for the run lifecycle. Every mutation goes through a lease
//! on the run, so concurrent mutations of one run are rejected instead of
//! interleaved.

use std::sync::Arc;
use uuid::Uuid;

use neuroscan_core::PipelineError;
use neuroscan_core::domain::log::LogEntry;
use neuroscan_core::domain::run::PipelineRun;
use neuroscan_core::dto::run::{CreateRun, RunFailure, RunSnapshot, RunSummary, SelectImage};
use neuroscan_pipeline::LogBufferService;

use crate::AppState;
use crate::repository::RunRecord;

/// Service error type
#[derive(Debug)]
pub enum RunError {
    NotFound(Uuid),
    ValidationError(String),
    Pipeline(PipelineError),
}

impl From<PipelineError> for RunError {
    fn from(err: PipelineError) -> Self {
        RunError::Pipeline(err)
    }
}

fn find(state: &AppState, id: Uuid) -> Result<Arc<RunRecord>, RunError> {
    state.runs.find_by_id(id).ok_or(RunError::NotFound(id))
}

fn validate_image_path(path: &std::path::Path) -> Result<(), RunError> {
    if path.as_os_str().is_empty() {
        return Err(RunError::ValidationError(
            "image_path must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Create a run for an image; the run is not started
pub fn create_run(state: &AppState, req: CreateRun) -> Result<RunSnapshot, RunError> {
    validate_image_path(&req.image_path)?;

    let record = state.runs.create(PipelineRun::new(req.image_path));
    tracing::info!("Run created: {}", record.id);

    Ok(record.snapshot(&state.controller))
}

/// List all runs, newest first
pub fn list_runs(state: &AppState) -> Vec<RunSummary> {
    state
        .runs
        .list()
        .iter()
        .map(|record| RunSummary::of(record.id, &record.shared.snapshot()))
        .collect()
}

/// Get a run by ID
pub fn get_run(state: &AppState, id: Uuid) -> Result<RunSnapshot, RunError> {
    Ok(find(state, id)?.snapshot(&state.controller))
}

/// Start a run that has an image
pub fn start_run(state: &AppState, id: Uuid) -> Result<RunSnapshot, RunError> {
    let record = find(state, id)?;
    {
        let mut run = record.shared.lease("start")?;
        state.controller.start(&mut run, &record.logs)?;
        record.set_last_error(None);
    }

    tracing::info!("Run started: {}", id);
    Ok(record.snapshot(&state.controller))
}

/// Execute the run's current stage
///
/// A stage failure is stored on the record as its last error while the run
/// is still leased, so it is never published after a concurrent reset.
pub async fn advance_run(state: &AppState, id: Uuid) -> Result<RunSnapshot, RunError> {
    let record = find(state, id)?;
    let outcome = {
        let mut run = record.shared.lease("advance")?;
        match state.controller.advance(&mut run, &record.logs).await {
            Ok(outcome) => outcome,
            Err(err) => {
                if let PipelineError::AgentInvocation {
                    stage_id,
                    message,
                    trace,
                } = &err
                {
                    record.set_last_error(Some(RunFailure {
                        stage_id: *stage_id,
                        message: message.clone(),
                        trace: trace.clone(),
                    }));
                }
                return Err(err.into());
            }
        }
    };

    tracing::info!(
        "Run {} finished stage '{}' ({}/{})",
        id,
        outcome.stage_id,
        outcome.ordinal + 1,
        state.controller.stage_count()
    );

    Ok(record.snapshot(&state.controller))
}

/// Return a run to not started, keeping its image
///
/// The diagnostic log starts over with the fresh run.
pub fn reset_run(state: &AppState, id: Uuid) -> Result<RunSnapshot, RunError> {
    let record = find(state, id)?;
    {
        let mut run = record.shared.lease("reset")?;
        clear_history(&record);
        state.controller.reset(&mut run, &record.logs);
    }

    tracing::info!("Run reset: {}", id);
    Ok(record.snapshot(&state.controller))
}

/// Point a run at another image
///
/// Replacing the image of a started run resets it.
pub fn select_image(state: &AppState, id: Uuid, req: SelectImage) -> Result<RunSnapshot, RunError> {
    validate_image_path(&req.image_path)?;

    let record = find(state, id)?;
    {
        let mut run = record.shared.lease("select an image")?;
        if run.select_image(req.image_path.clone()) {
            clear_history(&record);
            record.logs.add_entry(LogEntry::info(
                None,
                format!("Image changed to {}", req.image_path.display()),
            ));
        }
    }

    Ok(record.snapshot(&state.controller))
}

/// Delete a run and its log
///
/// Rejected while another operation holds the run.
pub fn delete_run(state: &AppState, id: Uuid) -> Result<(), RunError> {
    let record = find(state, id)?;
    let _run = record.shared.lease("delete")?;
    state.runs.delete(id);

    tracing::info!("Run deleted: {}", id);
    Ok(())
}

/// Drops the failure and log entries of a run that starts over
///
/// Callers hold the run's lease.
fn clear_history(record: &RunRecord) {
    record.set_last_error(None);
    let discarded = record.logs.drain();
    tracing::debug!("Discarded {} log entries of run {}", discarded.len(), record.id);
}

/// Diagnostic log of a run
pub fn run_logs(state: &AppState, id: Uuid) -> Result<Vec<LogEntry>, RunError> {
    Ok(find(state, id)?.logs.entries())
}

/// Final report of a completed run
pub fn final_report(state: &AppState, id: Uuid) -> Result<String, RunError> {
    let run = find(state, id)?.shared.snapshot();
    run.final_report().map(str::to_string).ok_or_else(|| {
        RunError::Pipeline(PipelineError::InvalidStateTransition(format!(
            "cannot export the report of a run that is {}",
            run.status()
        )))
    })
}
