//! Run command handlers
//!
//! Handles run lifecycle commands against a NeuroScan server.

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::Subcommand;
use colored::*;
use std::path::PathBuf;

use neuroscan_client::{ClientError, NeuroScanClient};
use neuroscan_core::domain::run::RunStatus;
use neuroscan_core::dto::run::{CreateRun, SelectImage};
use neuroscan_pipeline::report::report_file_name;

use crate::config::Config;
use crate::display::{print_log_entry, print_run_details, print_run_summary};
use crate::id_resolver::resolve_run_id;
use crate::types::IdOrPrefix;

/// Run subcommands
#[derive(Subcommand)]
pub enum RunCommands {
    /// Create a run for an image (path as seen by the server)
    Create {
        image: PathBuf,
    },
    /// List all runs
    List,
    /// Get run details
    Get {
        /// Run ID or unambiguous prefix
        id: String,
    },
    /// Start a run
    Start {
        /// Run ID or unambiguous prefix
        id: String,
    },
    /// Execute the next stage of a run
    Advance {
        /// Run ID or unambiguous prefix
        id: String,

        /// Keep advancing until the run completes or fails
        #[arg(short, long)]
        all: bool,
    },
    /// Return a run to not started, keeping its image
    Reset {
        /// Run ID or unambiguous prefix
        id: String,
    },
    /// Point a run at another image
    Image {
        /// Run ID or unambiguous prefix
        id: String,
        image: PathBuf,
    },
    /// Delete a run
    Delete {
        /// Run ID or unambiguous prefix
        id: String,
    },
    /// Get run logs
    Logs {
        /// Run ID or unambiguous prefix
        id: String,
    },
    /// Get the final report of a completed run
    Report {
        /// Run ID or unambiguous prefix
        id: String,

        /// Save the report into this directory instead of printing it
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

/// Handle run commands
///
/// Routes run subcommands to their respective handlers.
pub async fn handle_run_command(command: RunCommands, config: &Config) -> Result<()> {
    let client = NeuroScanClient::new(&config.server_url);

    match command {
        RunCommands::Create { image } => create_run(&client, image).await,
        RunCommands::List => list_runs(&client).await,
        RunCommands::Get { id } => get_run(&client, &id).await,
        RunCommands::Start { id } => start_run(&client, &id).await,
        RunCommands::Advance { id, all } => advance_run(&client, &id, all).await,
        RunCommands::Reset { id } => reset_run(&client, &id).await,
        RunCommands::Image { id, image } => select_image(&client, &id, image).await,
        RunCommands::Delete { id } => delete_run(&client, &id).await,
        RunCommands::Logs { id } => get_run_logs(&client, &id).await,
        RunCommands::Report { id, output_dir } => get_report(&client, &id, output_dir).await,
    }
}

/// Turns a client error into a message that says what went wrong
fn explain(err: ClientError, action: &str, server_url: &str) -> anyhow::Error {
    let message = match &err {
        ClientError::ApiError { message, .. } => message.clone(),
        other => other.to_string(),
    };

    if err.is_connect() {
        anyhow!(
            "Failed to {}: NeuroScan server unreachable at {} (is it running?)",
            action,
            server_url
        )
    } else if err.is_conflict() {
        anyhow!(
            "Failed to {}: {} (the run is busy or in the wrong state, see `neuroscan run get`)",
            action,
            message
        )
    } else if err.is_not_found() {
        anyhow!("Failed to {}: {}", action, message)
    } else if err.is_server_error() {
        anyhow!("Failed to {}: server error: {}", action, message)
    } else if err.is_client_error() {
        anyhow!("Failed to {}: request rejected: {}", action, message)
    } else {
        anyhow::Error::new(err).context(format!("Failed to {}", action))
    }
}

async fn resolve(client: &NeuroScanClient, id: &str) -> Result<uuid::Uuid> {
    resolve_run_id(client, &IdOrPrefix::parse(id)).await
}

async fn create_run(client: &NeuroScanClient, image: PathBuf) -> Result<()> {
    let snapshot = client
        .create_run(CreateRun { image_path: image })
        .await
        .map_err(|e| explain(e, "create run", client.base_url()))?;

    println!("{}", "✓ Run created".green());
    println!("  ID: {}", snapshot.id.to_string().cyan());

    Ok(())
}

async fn list_runs(client: &NeuroScanClient) -> Result<()> {
    let runs = client
        .list_runs()
        .await
        .map_err(|e| explain(e, "list runs", client.base_url()))?;

    if runs.is_empty() {
        println!("{}", "No runs found.".yellow());
    } else {
        println!("{}", format!("Found {} run(s):", runs.len()).bold());
        println!();
        for run in &runs {
            print_run_summary(run);
        }
    }

    Ok(())
}

async fn get_run(client: &NeuroScanClient, id: &str) -> Result<()> {
    let uuid = resolve(client, id).await?;
    let snapshot = client
        .get_run(uuid)
        .await
        .map_err(|e| explain(e, "get run", client.base_url()))?;

    print_run_details(&snapshot);

    Ok(())
}

async fn start_run(client: &NeuroScanClient, id: &str) -> Result<()> {
    let uuid = resolve(client, id).await?;
    client
        .start_run(uuid)
        .await
        .map_err(|e| explain(e, "start run", client.base_url()))?;

    println!("{}", format!("✓ Run {} started", uuid).green());

    Ok(())
}

async fn advance_run(client: &NeuroScanClient, id: &str, all: bool) -> Result<()> {
    let uuid = resolve(client, id).await?;

    loop {
        let snapshot = client
            .advance_run(uuid)
            .await
            .map_err(|e| explain(e, "advance run", client.base_url()))?;

        let finished = snapshot
            .progress
            .current_ordinal
            .checked_sub(1)
            .and_then(|ordinal| snapshot.progress.stages.get(ordinal));
        if let Some(stage) = finished {
            println!("{} {}", "✓".green(), stage.display_name.green());
            if let Some(result) = &stage.result {
                for line in result.lines() {
                    println!("    {}", line);
                }
            }
        }

        if !all || snapshot.run.status() != RunStatus::Running {
            if snapshot.run.status() == RunStatus::Completed {
                println!("\n{}", "✓ Run completed".green().bold());
            }
            return Ok(());
        }
    }
}

async fn reset_run(client: &NeuroScanClient, id: &str) -> Result<()> {
    let uuid = resolve(client, id).await?;
    client
        .reset_run(uuid)
        .await
        .map_err(|e| explain(e, "reset run", client.base_url()))?;

    println!("{}", format!("✓ Run {} reset", uuid).green());

    Ok(())
}

async fn select_image(client: &NeuroScanClient, id: &str, image: PathBuf) -> Result<()> {
    let uuid = resolve(client, id).await?;
    let snapshot = client
        .select_image(uuid, SelectImage { image_path: image })
        .await
        .map_err(|e| explain(e, "select image", client.base_url()))?;

    if let Some(image) = snapshot.run.image_reference() {
        println!("{} {}", "✓ Run now analyzes".green(), image.display());
    }

    Ok(())
}

async fn delete_run(client: &NeuroScanClient, id: &str) -> Result<()> {
    let uuid = resolve(client, id).await?;
    client
        .delete_run(uuid)
        .await
        .map_err(|e| explain(e, "delete run", client.base_url()))?;

    println!("{}", format!("✓ Run {} deleted", uuid).green());

    Ok(())
}

async fn get_run_logs(client: &NeuroScanClient, id: &str) -> Result<()> {
    let uuid = resolve(client, id).await?;
    let logs = client
        .get_run_logs(uuid)
        .await
        .map_err(|e| explain(e, "get logs", client.base_url()))?;

    if logs.is_empty() {
        println!("{}", "No logs found for this run.".yellow());
    } else {
        println!("{}", format!("Logs for run {}:", uuid).bold());
        println!("{}", "─".repeat(80).dimmed());
        for log in &logs {
            print_log_entry(log);
        }
        println!("{}", "─".repeat(80).dimmed());
    }

    Ok(())
}

async fn get_report(client: &NeuroScanClient, id: &str, output_dir: Option<PathBuf>) -> Result<()> {
    let uuid = resolve(client, id).await?;
    let report = client
        .get_run_report(uuid)
        .await
        .map_err(|e| explain(e, "fetch report", client.base_url()))?;

    match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let path = dir.join(report_file_name(Local::now()));
            std::fs::write(&path, report)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} {}", "✓ Report saved to".green(), path.display());
        }
        None => println!("{}", report),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://localhost:8080";

    #[test]
    fn test_conflict_says_run_is_busy() {
        let err = ClientError::api_error(409, "cannot advance: the run is busy with another operation");
        let text = explain(err, "advance run", URL).to_string();
        assert!(text.starts_with("Failed to advance run: cannot advance"));
        assert!(text.contains("busy or in the wrong state"));
    }

    #[test]
    fn test_status_classes() {
        let text = explain(ClientError::api_error(502, "Stage 'report' failed"), "advance run", URL);
        assert_eq!(
            text.to_string(),
            "Failed to advance run: server error: Stage 'report' failed"
        );

        let text = explain(ClientError::api_error(400, "image_path must not be empty"), "create run", URL);
        assert!(text.to_string().contains("request rejected"));

        let text = explain(ClientError::api_error(404, "Run x not found"), "get run", URL);
        assert_eq!(text.to_string(), "Failed to get run: Run x not found");
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1/health")
            .send()
            .await
            .unwrap_err();

        let text = explain(ClientError::from(err), "list runs", URL).to_string();
        assert!(text.contains("server unreachable at http://localhost:8080"));
    }
}
