//! Classifier-only command

use anyhow::{Context, Result};
use colored::*;
use std::path::PathBuf;

use neuroscan_pipeline::setup;

use crate::config::Config;

pub async fn handle_classify(image: PathBuf, config: &Config) -> Result<()> {
    let pipeline = config.pipeline()?;
    let classifier = setup::classifier(&pipeline).await;

    let classification = classifier
        .classify(&image)
        .await
        .with_context(|| format!("Failed to classify {}", image.display()))?;

    let label = if classification.has_tumor() {
        classification.label.red().bold()
    } else {
        classification.label.green().bold()
    };

    println!("{}", "Classification:".bold());
    println!("  Image:             {}", image.display());
    println!("  Diagnosis:         {}", label);
    println!("  Confidence:        {:.1}%", classification.confidence_percent);
    println!(
        "  Tumor probability: {:.1}%",
        classification.tumor_probability_percent
    );

    Ok(())
}
