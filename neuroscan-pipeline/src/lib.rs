//! NeuroScan Pipeline
//!
//! Sequential multi-agent analysis of brain MRI images.
//!
//! Architecture:
//! - Configuration: backing-service settings from the environment
//! - Adapters: image classifier, medical knowledge base, treatment lookup
//! - Agents: one reasoning agent per stage, backed by a local LLM
//! - Stages: the fixed four-stage catalogue and its input builders
//! - Executor: runs one stage and filters its output
//! - Controller: the run state machine, advanced one stage per call
//!
//! A caller creates a [`PipelineRun`](neuroscan_core::domain::run::PipelineRun),
//! starts it, then calls [`PipelineController::advance`] until it completes or
//! fails, reading progress between calls.

pub mod agent;
pub mod classifier;
pub mod config;
pub mod controller;
pub mod executor;
pub mod guard;
pub mod knowledge;
pub mod log_buffer;
pub mod report;
pub mod setup;
pub mod stages;

pub use config::{KnowledgeBackend, PipelineConfig};
pub use controller::{AdvanceOutcome, PipelineController};
pub use executor::{AgentSet, StageExecutor};
pub use guard::{RunLease, SharedRun};
pub use log_buffer::{InMemoryLogBuffer, LogBufferService, NullLogBuffer};
