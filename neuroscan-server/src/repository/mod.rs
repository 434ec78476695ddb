//! Repository Module
//!
//! Run storage for the server. Runs live in memory for the lifetime of the
//! process; nothing is persisted.

pub mod run;

pub use run::{RunRecord, RunRepository};
