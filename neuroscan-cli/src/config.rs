//! Configuration module
//!
//! Handles CLI configuration: the server URL for remote commands and the
//! pipeline settings for local ones.

use anyhow::{Context, Result};
use neuroscan_pipeline::PipelineConfig;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the NeuroScan server
    pub server_url: String,
}

impl Config {
    /// Pipeline settings from the environment, validated
    ///
    /// Falls back to the defaults when the environment cannot be read.
    pub fn pipeline(&self) -> Result<PipelineConfig> {
        let config = PipelineConfig::from_env().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config from environment: {}", e);
            PipelineConfig::default()
        });
        config.validate().context("Invalid pipeline configuration")?;
        Ok(config)
    }
}
