//! Treatment graph command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;

use neuroscan_client::GraphEdge;
use neuroscan_pipeline::knowledge::graph::{medical_graph, to_dot};
use neuroscan_pipeline::setup;

use crate::config::Config;

/// Graph subcommands
#[derive(Subcommand)]
pub enum GraphCommands {
    /// Check the connection to Neo4j
    Ping,
    /// Create the reference medical graph (idempotent)
    Seed,
    /// List every relation in the graph
    Edges {
        /// Print Graphviz DOT instead of a listing
        #[arg(long)]
        dot: bool,
    },
}

pub async fn handle_graph_command(command: GraphCommands, config: &Config) -> Result<()> {
    let pipeline = config.pipeline()?;
    let client = setup::neo4j_client(&pipeline);

    match command {
        GraphCommands::Ping => {
            client
                .ping()
                .await
                .with_context(|| format!("Failed to reach Neo4j at {}", client.base_url()))?;
            println!("{} {}", "✓ Connected to".green(), client.base_url());
        }
        GraphCommands::Seed => {
            let edges = medical_graph();
            client
                .merge_edges(&edges)
                .await
                .context("Failed to seed the medical graph")?;
            println!("{}", format!("✓ Seeded {} relation(s)", edges.len()).green());
        }
        GraphCommands::Edges { dot } => {
            let edges = client.edges().await.context("Failed to read the graph")?;
            if dot {
                println!("{}", to_dot(&edges));
            } else if edges.is_empty() {
                println!("{}", "The graph is empty.".yellow());
            } else {
                for edge in &edges {
                    print_edge(edge);
                }
            }
        }
    }

    Ok(())
}

fn print_edge(edge: &GraphEdge) {
    println!(
        "  ({}:{}) -[{}]-> ({}:{})",
        edge.source.label.dimmed(),
        edge.source.name,
        edge.relation.cyan(),
        edge.target.label.dimmed(),
        edge.target.name
    );
}
