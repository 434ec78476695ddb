//! Service Layer
//!
//! Business logic between the HTTP handlers and the run repository.

pub mod knowledge;
pub mod run;

pub use knowledge as knowledge_service;
pub use run as run_service;
