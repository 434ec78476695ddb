//! Scripted collaborators for controller tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use neuroscan_core::domain::classification::Classification;
use neuroscan_core::domain::stage::{StageId, StageInput};
use neuroscan_core::{ClassifierError, LookupError};
use neuroscan_pipeline::agent::{AgentPersona, ReasoningAgent};
use neuroscan_pipeline::classifier::Classifier;
use neuroscan_pipeline::knowledge::TreatmentLookup;
use neuroscan_pipeline::stages::standard_stages;
use neuroscan_pipeline::{AgentSet, PipelineController};

/// Agent answering from a fixed script and recording its inputs
pub struct ScriptedAgent {
    reply: Result<String, String>,
    pub inputs: Mutex<Vec<StageInput>>,
}

impl ScriptedAgent {
    pub fn ok(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            inputs: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            inputs: Mutex::new(Vec::new()),
        })
    }

    pub fn last_input(&self) -> Option<StageInput> {
        self.inputs.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ReasoningAgent for ScriptedAgent {
    fn persona(&self) -> &AgentPersona {
        &AgentPersona::CLINICAL_ANALYST
    }

    async fn invoke(&self, input: &StageInput) -> anyhow::Result<String> {
        self.inputs.lock().unwrap().push(input.clone());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(anyhow::anyhow!("{}", message).context("model call failed")),
        }
    }
}

pub struct FakeClassifier {
    pub available: bool,
}

#[async_trait]
impl Classifier for FakeClassifier {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn classify(&self, image_path: &Path) -> Result<Classification, ClassifierError> {
        if !image_path.is_file() {
            return Err(ClassifierError::ImageNotFound(image_path.to_path_buf()));
        }
        Classification::from_probability(0.9)
    }
}

pub struct FakeLookup {
    reply: Result<Vec<String>, String>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeLookup {
    pub fn returning(treatments: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(treatments.iter().map(|t| t.to_string()).collect()),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl TreatmentLookup for FakeLookup {
    async fn treatments_for(&self, text: &str) -> Result<Vec<String>, LookupError> {
        self.queries.lock().unwrap().push(text.to_string());
        self.reply.clone().map_err(LookupError::new)
    }
}

/// One agent per stage, in catalogue order
pub struct Agents {
    pub classification: Arc<ScriptedAgent>,
    pub clinical: Arc<ScriptedAgent>,
    pub recommendations: Arc<ScriptedAgent>,
    pub report: Arc<ScriptedAgent>,
}

impl Agents {
    pub fn all_ok() -> Self {
        Self {
            classification: ScriptedAgent::ok(
                "Diagnosis: Tumor detected\nNotes: blurry scan\nConfidence: 92%\nType: Glioblastoma",
            ),
            clinical: ScriptedAgent::ok("Type: Glioblastoma\nGrade: IV\nchatter\nPrognosis: poor"),
            recommendations: ScriptedAgent::ok("Urgency: high\nTreatment: surgery\nFollow-up: 3 months"),
            report: ScriptedAgent::ok("MEDICAL REPORT\n\nFindings: glioblastoma"),
        }
    }

    pub fn set(&self) -> AgentSet {
        AgentSet::new()
            .bind(StageId::Classification, self.classification.clone())
            .bind(StageId::ClinicalAnalysis, self.clinical.clone())
            .bind(StageId::Recommendations, self.recommendations.clone())
            .bind(StageId::Report, self.report.clone())
    }
}

pub fn controller(agents: &Agents, lookup: Arc<FakeLookup>) -> PipelineController {
    PipelineController::new(
        standard_stages(),
        agents.set(),
        Arc::new(FakeClassifier { available: true }),
        lookup,
    )
    .unwrap()
}

/// A real file to point runs at
pub fn image() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.png");
    std::fs::write(&path, b"png").unwrap();
    (dir, path)
}
