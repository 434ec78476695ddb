//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod analyze;
mod classify;
mod graph;
mod knowledge;
mod run;
mod stages;

pub use graph::GraphCommands;
pub use knowledge::KnowledgeCommands;
pub use run::RunCommands;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Analyze an MRI image locally, stage by stage
    Analyze {
        /// Path to the MRI image (PNG or JPEG)
        image: PathBuf,

        /// Directory the final report is exported to (default: REPORT_DIR)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Print the finished run as JSON instead of the progress display
        #[arg(long)]
        json: bool,
    },
    /// List the pipeline stages
    Stages,
    /// Run only the image classifier on an image
    Classify {
        /// Path to the MRI image
        image: PathBuf,
    },
    /// Medical knowledge base
    Knowledge {
        #[command(subcommand)]
        command: KnowledgeCommands,
    },
    /// Treatment graph management
    Graph {
        #[command(subcommand)]
        command: GraphCommands,
    },
    /// Runs on a NeuroScan server
    Run {
        #[command(subcommand)]
        command: RunCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Analyze {
            image,
            output_dir,
            json,
        } => analyze::handle_analyze(image, output_dir, json, config).await,
        Commands::Stages => stages::handle_stages(),
        Commands::Classify { image } => classify::handle_classify(image, config).await,
        Commands::Knowledge { command } => {
            knowledge::handle_knowledge_command(command, config).await
        }
        Commands::Graph { command } => graph::handle_graph_command(command, config).await,
        Commands::Run { command } => run::handle_run_command(command, config).await,
    }
}
