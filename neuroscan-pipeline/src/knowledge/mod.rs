//! Medical knowledge
//!
//! - [`MedicalKnowledgeBase`]: static reference passages handed to stage agents
//! - [`TreatmentLookup`]: the tumor -> treatment side channel, backed either by
//!   an in-memory table or a Neo4j graph
//! - [`graph`]: seeding, listing and rendering the treatment graph

mod base;
pub mod graph;
mod treatments;

pub use base::{KnowledgeSection, MedicalKnowledgeBase};
pub use treatments::{Neo4jTreatmentLookup, StaticTreatmentGraph, TreatmentLookup};
