//! Terminal rendering shared by the commands

use colored::*;
use neuroscan_core::domain::log::{LogEntry, LogLevel};
use neuroscan_core::domain::progress::{RunProgress, StageState};
use neuroscan_core::domain::run::RunStatus;
use neuroscan_core::dto::run::{RunSnapshot, RunSummary};

/// Colorize run status for display
pub fn colorize_status(status: RunStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        RunStatus::NotStarted => status_str.yellow(),
        RunStatus::Running => status_str.cyan(),
        RunStatus::Completed => status_str.green(),
        RunStatus::Failed => status_str.red(),
    }
}

pub fn stage_badge(state: StageState) -> ColoredString {
    match state {
        StageState::Pending => "○".dimmed(),
        StageState::Running => "▸".cyan(),
        StageState::Completed => "✓".green(),
        StageState::Failed => "✗".red(),
    }
}

/// "42s" below a minute, "3m 07s" above
pub fn format_elapsed(seconds: i64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else {
        format!("{}m {:02}s", seconds / 60, seconds % 60)
    }
}

/// Print the per-stage lines of a progress read-model
pub fn print_progress(progress: &RunProgress) {
    println!(
        "  Progress: {}/{} ({:.0}%)",
        progress.display_step,
        progress.stage_count,
        progress.fraction * 100.0
    );
    if let Some(seconds) = progress.elapsed_seconds {
        println!("  Elapsed:  {}", format_elapsed(seconds));
    }
    println!();
    for stage in &progress.stages {
        println!(
            "  {} {} {}",
            stage_badge(stage.state),
            stage.display_name.bold(),
            format!("({})", stage.summary).dimmed()
        );
        if let Some(result) = &stage.result {
            for line in result.lines() {
                println!("      {}", line);
            }
        }
    }
}

/// Print a run summary line
pub fn print_run_summary(run: &RunSummary) {
    println!("  {} Run {}", "▸".cyan(), run.id.to_string().dimmed());
    println!("    Status:  {}", colorize_status(run.status));
    println!("    Stage:   {}", run.current_ordinal);
    if let Some(image) = &run.image_reference {
        println!("    Image:   {}", image.display());
    }
    if let Some(started) = run.started_at {
        println!(
            "    Started: {}",
            started.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
    }
    println!();
}

/// Print detailed run information
pub fn print_run_details(snapshot: &RunSnapshot) {
    let run = &snapshot.run;

    println!("{}", "Run Details:".bold());
    println!("  ID:       {}", snapshot.id.to_string().cyan());
    println!("  Status:   {}", colorize_status(run.status()));
    if let Some(image) = run.image_reference() {
        println!("  Image:    {}", image.display());
    }
    if let Some(started) = run.start_timestamp() {
        println!("  Started:  {}", started.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(finished) = run.finished_at() {
        println!("  Finished: {}", finished.format("%Y-%m-%d %H:%M:%S"));
    }

    println!();
    print_progress(&snapshot.progress);

    if let Some(treatments) = run.results().get(neuroscan_core::domain::stage::TREATMENTS_KEY) {
        print_treatments(treatments);
    }

    if let Some(failure) = &snapshot.last_error {
        println!("\n{}", "Error:".bold());
        println!("  Stage: {}", failure.stage_id);
        println!("  {}", failure.message.red());
    }
}

pub fn print_treatments(treatments: &str) {
    println!("\n{}", "Known treatments:".bold());
    if treatments.is_empty() {
        println!("  {}", "none found".dimmed());
    }
    for treatment in treatments.lines() {
        println!("  • {}", treatment);
    }
}

/// Print a log entry
pub fn print_log_entry(log: &LogEntry) {
    let level_str = format!("{:?}", log.level).to_uppercase();
    let level_colored = match log.level {
        LogLevel::Debug => level_str.dimmed(),
        LogLevel::Info => level_str.cyan(),
        LogLevel::Warning => level_str.yellow(),
        LogLevel::Error => level_str.red(),
    };

    let stage = log
        .stage
        .map(|s| format!(" {}", s))
        .unwrap_or_default();

    println!(
        "{} [{}]{} {}",
        log.timestamp.format("%H:%M:%S").to_string().dimmed(),
        level_colored,
        stage.dimmed(),
        log.message
    );
}
