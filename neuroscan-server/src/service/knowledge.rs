//! Knowledge Service
//!
//! Reference passages and treatment lookups outside of a run.

use neuroscan_core::LookupError;
use neuroscan_core::dto::knowledge::{KnowledgeResponse, TreatmentsResponse};
use neuroscan_pipeline::knowledge::MedicalKnowledgeBase;

use crate::AppState;

/// Passages of the medical knowledge base relevant to `query`
pub fn search(query: &str) -> KnowledgeResponse {
    KnowledgeResponse {
        query: query.to_string(),
        passages: MedicalKnowledgeBase::new().search(query),
    }
}

/// Treatments of every tumor named in `label`
pub async fn treatments(state: &AppState, label: &str) -> Result<TreatmentsResponse, LookupError> {
    let treatments = state
        .controller
        .treatment_lookup()
        .treatments_for(label)
        .await?;

    Ok(TreatmentsResponse {
        label: label.to_string(),
        treatments,
    })
}
