//! Wiring of the production pipeline from configuration

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use neuroscan_client::{ModelServerClient, Neo4jClient, OllamaClient};

use crate::agent::{LanguageModel, OllamaModel};
use crate::classifier::{Classifier, ModelServerClassifier};
use crate::config::{KnowledgeBackend, PipelineConfig};
use crate::controller::PipelineController;
use crate::executor::AgentSet;
use crate::knowledge::{Neo4jTreatmentLookup, StaticTreatmentGraph, TreatmentLookup};
use crate::stages::standard_stages;

pub fn neo4j_client(config: &PipelineConfig) -> Neo4jClient {
    Neo4jClient::new(
        &config.neo4j_url,
        &config.neo4j_database,
        &config.neo4j_user,
        &config.neo4j_password,
    )
}

/// Treatment lookup for the configured backend
pub fn treatment_lookup(config: &PipelineConfig) -> Arc<dyn TreatmentLookup> {
    match config.knowledge_backend {
        KnowledgeBackend::Static => Arc::new(StaticTreatmentGraph::seeded()),
        KnowledgeBackend::Neo4j => Arc::new(Neo4jTreatmentLookup::new(neo4j_client(config))),
    }
}

/// Connects to the model server; the model is probed exactly once here
pub async fn classifier(config: &PipelineConfig) -> Arc<dyn Classifier> {
    let client = ModelServerClient::new(&config.classifier_url, &config.classifier_model);
    Arc::new(ModelServerClassifier::connect(client).await)
}

pub fn language_model(config: &PipelineConfig) -> Result<Arc<dyn LanguageModel>> {
    let client = OllamaClient::with_timeout(
        &config.ollama_host,
        &config.ollama_model,
        config.temperature,
        config.llm_timeout,
    )
    .context("Failed to build Ollama client")?;

    Ok(Arc::new(OllamaModel::new(client)))
}

/// Builds the four-stage controller against the configured services
pub async fn build_controller(config: &PipelineConfig) -> Result<PipelineController> {
    let classifier = classifier(config).await;
    let model = language_model(config)?;
    let agents = AgentSet::standard(classifier.clone(), model);

    info!(
        "Pipeline ready: model={}, classifier={}, knowledge={:?}",
        config.ollama_model, config.classifier_model, config.knowledge_backend
    );

    PipelineController::new(standard_stages(), agents, classifier, treatment_lookup(config))
        .context("Invalid stage definition")
}
