//! NeuroScan Core
//!
//! Core types and abstractions for the NeuroScan MRI analysis pipeline.
//!
//! This crate contains:
//! - Domain types: Core pipeline entities (PipelineStage, PipelineRun, AgentOutcome, etc.)
//! - The keyword result extractor applied to every stage output
//! - Error types shared by the pipeline, the server and the CLI
//! - DTOs: Data transfer objects for the server API

pub mod domain;
pub mod dto;
pub mod error;
pub mod extract;

pub use error::{ClassifierError, LookupError, PipelineError};
pub use extract::extract;
