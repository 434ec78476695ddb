//! Knowledge DTOs

use serde::{Deserialize, Serialize};

/// Passages the knowledge base returned for a query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeResponse {
    pub query: String,
    pub passages: String,
}

/// Treatments linked to a diagnosis label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreatmentsResponse {
    pub label: String,
    pub treatments: Vec<String>,
}
