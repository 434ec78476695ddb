//! Knowledge command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;

use neuroscan_pipeline::knowledge::MedicalKnowledgeBase;
use neuroscan_pipeline::setup;

use crate::config::Config;

/// Knowledge subcommands
#[derive(Subcommand)]
pub enum KnowledgeCommands {
    /// Search the medical knowledge base
    Search {
        /// Free-text query, e.g. "glioblastoma treatment"
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Look up treatments for a diagnosis
    Treatments {
        /// Diagnosis text naming a tumor, e.g. "Glioblastoma"
        label: String,
    },
}

pub async fn handle_knowledge_command(command: KnowledgeCommands, config: &Config) -> Result<()> {
    match command {
        KnowledgeCommands::Search { query } => {
            search(&query.join(" "));
            Ok(())
        }
        KnowledgeCommands::Treatments { label } => treatments(&label, config).await,
    }
}

fn search(query: &str) {
    let knowledge = MedicalKnowledgeBase::new();

    for section in knowledge.matching(query) {
        println!("{}", section.key.to_uppercase().bold());
        println!("{}", section.text.trim());
        println!();
    }
}

async fn treatments(label: &str, config: &Config) -> Result<()> {
    let pipeline = config.pipeline()?;
    let lookup = setup::treatment_lookup(&pipeline);

    let treatments = lookup
        .treatments_for(label)
        .await
        .context("Treatment lookup failed")?;

    if treatments.is_empty() {
        println!("{}", format!("No treatments found for '{}'.", label).yellow());
    } else {
        println!("{}", format!("Treatments for '{}':", label).bold());
        for treatment in treatments {
            println!("  • {}", treatment);
        }
    }

    Ok(())
}
