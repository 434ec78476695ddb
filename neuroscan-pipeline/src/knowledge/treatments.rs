//! Treatment lookup side channel

use async_trait::async_trait;
use std::collections::BTreeMap;

use neuroscan_client::Neo4jClient;
use neuroscan_core::LookupError;

/// Tumor -> treatment side channel
///
/// Called with the classification stage's extracted text; returns the
/// treatments of every known tumor named in it.
#[async_trait]
pub trait TreatmentLookup: Send + Sync {
    async fn treatments_for(&self, text: &str) -> Result<Vec<String>, LookupError>;
}

/// In-memory treatment table
///
/// A tumor matches when its name occurs in the query, ignoring case.
#[derive(Debug, Clone, Default)]
pub struct StaticTreatmentGraph {
    treatments: BTreeMap<String, Vec<String>>,
}

impl StaticTreatmentGraph {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table seeded with the reference medical graph
    pub fn seeded() -> Self {
        let mut graph = Self::new();
        for edge in super::graph::medical_graph() {
            if edge.relation == super::graph::TREATED_BY {
                graph = graph.with_treatment(&edge.source.name, &edge.target.name);
            }
        }
        graph
    }

    pub fn with_treatment(mut self, tumor: &str, treatment: &str) -> Self {
        self.treatments
            .entry(tumor.to_string())
            .or_default()
            .push(treatment.to_string());
        self
    }

    fn lookup(&self, text: &str) -> Vec<String> {
        let text = text.to_lowercase();
        let mut found: Vec<String> = Vec::new();
        for (tumor, treatments) in &self.treatments {
            if !text.contains(&tumor.to_lowercase()) {
                continue;
            }
            for treatment in treatments {
                if !found.contains(treatment) {
                    found.push(treatment.clone());
                }
            }
        }
        found
    }
}

#[async_trait]
impl TreatmentLookup for StaticTreatmentGraph {
    async fn treatments_for(&self, text: &str) -> Result<Vec<String>, LookupError> {
        Ok(self.lookup(text))
    }
}

/// Treatment lookup over a Neo4j graph
pub struct Neo4jTreatmentLookup {
    client: Neo4jClient,
}

impl Neo4jTreatmentLookup {
    pub fn new(client: Neo4jClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TreatmentLookup for Neo4jTreatmentLookup {
    async fn treatments_for(&self, text: &str) -> Result<Vec<String>, LookupError> {
        self.client
            .treatments_matching(text)
            .await
            .map_err(|e| LookupError::new(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_graph_matches_tumor_name_in_text() {
        let graph = StaticTreatmentGraph::seeded();

        let found = graph
            .treatments_for("Diagnosis: Tumor detected\nType: GLIOBLASTOMA suspected")
            .await
            .unwrap();
        assert_eq!(found, vec!["Surgery + Radiotherapy".to_string()]);

        let none = graph.treatments_for("Diagnosis: No tumor detected").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_treatments_are_deduplicated() {
        let graph = StaticTreatmentGraph::new()
            .with_treatment("Astrocytoma", "Surgery")
            .with_treatment("Glioma", "Surgery")
            .with_treatment("Glioma", "Chemotherapy");

        let found = graph.treatments_for("glioma vs astrocytoma").await.unwrap();
        assert_eq!(found, vec!["Surgery".to_string(), "Chemotherapy".to_string()]);
    }
}
