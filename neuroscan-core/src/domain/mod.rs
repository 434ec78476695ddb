//! Core domain types
//!
//! This module contains the core domain structures used across NeuroScan crates.
//! The pipeline crate drives them, the server exposes them and the CLI renders them.

pub mod classification;
pub mod log;
pub mod outcome;
pub mod progress;
pub mod run;
pub mod stage;
