//! Data Transfer Objects for the server API
//!
//! This module contains the request and response bodies exchanged between the
//! NeuroScan server and its clients (the CLI, or anything speaking HTTP).

pub mod knowledge;
pub mod run;
pub mod stage;
