//! Local analysis command
//!
//! Drives the pipeline in-process, one stage per step, printing each stage as
//! it completes.

use anyhow::{Result, bail};
use chrono::Local;
use colored::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

use neuroscan_core::PipelineError;
use neuroscan_core::domain::progress::{RunProgress, StageState};
use neuroscan_core::domain::run::{PipelineRun, RunStatus};
use neuroscan_core::dto::run::RunFailure;
use neuroscan_pipeline::report::export_report;
use neuroscan_pipeline::setup::build_controller;
use neuroscan_pipeline::{InMemoryLogBuffer, LogBufferService, PipelineController};

use crate::config::Config;
use crate::display::{format_elapsed, print_log_entry, print_treatments, stage_badge};

/// Finished run as printed by `--json`
#[derive(Serialize)]
struct AnalysisOutput {
    run: PipelineRun,
    progress: RunProgress,
    failure: Option<RunFailure>,
    report_path: Option<PathBuf>,
}

pub async fn handle_analyze(
    image: PathBuf,
    output_dir: Option<PathBuf>,
    json: bool,
    config: &Config,
) -> Result<()> {
    let pipeline = config.pipeline()?;
    let controller = build_controller(&pipeline).await?;
    let logs = InMemoryLogBuffer::new();
    let mut run = PipelineRun::new(image.clone());

    if !json {
        println!("{} {}", "Analyzing".bold(), image.display());
        println!();
    }

    let failure = match drive(&controller, &mut run, &logs, json).await {
        Ok(()) => None,
        Err(PipelineError::AgentInvocation {
            stage_id,
            message,
            trace,
        }) => Some(RunFailure {
            stage_id,
            message,
            trace,
        }),
        // Rejected before the first stage ran
        Err(err) => return Err(err.into()),
    };

    let report_path = if run.status() == RunStatus::Completed {
        let dir = output_dir.unwrap_or_else(|| pipeline.report_dir.clone());
        Some(export_report(&run, &dir, Local::now())?)
    } else {
        None
    };

    if json {
        let output = AnalysisOutput {
            progress: controller.progress(&run),
            run,
            failure: failure.clone(),
            report_path,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_outcome(&run, &controller, failure.as_ref(), report_path.as_deref(), &logs);
    }

    if let Some(failure) = failure {
        bail!("Analysis failed at stage '{}': {}", failure.stage_id, failure.message);
    }
    Ok(())
}

/// Starts the run and advances it until it completes or a stage fails
async fn drive(
    controller: &PipelineController,
    run: &mut PipelineRun,
    logs: &InMemoryLogBuffer,
    quiet: bool,
) -> Result<(), PipelineError> {
    let stage_count = controller.stage_count();
    let result = controller
        .run_to_completion(run, logs, |_, outcome| {
            if quiet {
                return;
            }
            let Some(stage) = controller.stages().get(outcome.ordinal) else {
                return;
            };

            println!(
                "{} [{}/{}] {} {}",
                stage_badge(StageState::Completed),
                outcome.ordinal + 1,
                stage_count,
                stage.display_name.green(),
                format!("({})", stage.summary).dimmed()
            );
            for line in outcome.extracted_text.lines() {
                println!("    {}", line);
            }
            if let Some(treatments) = &outcome.treatments {
                print_treatments(treatments);
            }
            println!();
        })
        .await;

    if result.is_err() && !quiet {
        let failed = run
            .failed_ordinal()
            .and_then(|ordinal| controller.stages().get(ordinal).map(|stage| (ordinal, stage)));
        if let Some((ordinal, stage)) = failed {
            println!(
                "{} [{}/{}] {}",
                stage_badge(StageState::Failed),
                ordinal + 1,
                stage_count,
                stage.display_name.red()
            );
        }
    }

    result
}

fn print_outcome(
    run: &PipelineRun,
    controller: &PipelineController,
    failure: Option<&RunFailure>,
    report_path: Option<&Path>,
    logs: &InMemoryLogBuffer,
) {
    let progress = controller.progress(run);
    if let Some(seconds) = progress.elapsed_seconds {
        println!("{} {}", "Elapsed:".bold(), format_elapsed(seconds));
    }

    if let Some(failure) = failure {
        println!("\n{}", "Error:".bold());
        println!("  {}", failure.message.red());
        println!("\n{}", "Diagnostic log:".bold());
        println!("{}", "─".repeat(80).dimmed());
        for entry in logs.entries() {
            print_log_entry(&entry);
        }
        println!("{}", "─".repeat(80).dimmed());
        return;
    }

    if let Some(report) = run.final_report() {
        println!("\n{}", "Final report:".bold());
        println!("{}", "─".repeat(80).dimmed());
        println!("{}", report);
        println!("{}", "─".repeat(80).dimmed());
    }

    if let Some(path) = report_path {
        println!("{} {}", "✓ Report saved to".green(), path.display());
    }
}
