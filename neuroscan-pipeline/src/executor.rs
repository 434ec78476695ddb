//! Stage executor
//!
//! Runs one stage: builds its input from the run, invokes the bound agent,
//! filters the raw answer through the stage keywords. Agent errors are turned
//! into failed outcomes here and never reach the controller as errors.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

use neuroscan_core::domain::log::LogEntry;
use neuroscan_core::domain::outcome::AgentOutcome;
use neuroscan_core::domain::run::PipelineRun;
use neuroscan_core::domain::stage::{PipelineStage, StageId};
use neuroscan_core::extract;

use crate::agent::{AgentPersona, ClassificationAgent, LanguageModel, LlmAgent, ReasoningAgent};
use crate::classifier::Classifier;
use crate::log_buffer::LogBufferService;

/// Agents bound to stage ids
#[derive(Clone, Default)]
pub struct AgentSet {
    agents: HashMap<StageId, Arc<dyn ReasoningAgent>>,
}

impl AgentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The production binding: classifier-backed radiologist, then three LLM personas
    pub fn standard(classifier: Arc<dyn Classifier>, model: Arc<dyn LanguageModel>) -> Self {
        Self::new()
            .bind(
                StageId::Classification,
                Arc::new(ClassificationAgent::new(classifier, model.clone())),
            )
            .bind(
                StageId::ClinicalAnalysis,
                Arc::new(LlmAgent::new(AgentPersona::CLINICAL_ANALYST, model.clone())),
            )
            .bind(
                StageId::Recommendations,
                Arc::new(LlmAgent::new(AgentPersona::TREATMENT_SPECIALIST, model.clone())),
            )
            .bind(
                StageId::Report,
                Arc::new(LlmAgent::new(AgentPersona::REPORT_WRITER, model)),
            )
    }

    pub fn bind(mut self, stage_id: StageId, agent: Arc<dyn ReasoningAgent>) -> Self {
        self.agents.insert(stage_id, agent);
        self
    }

    pub fn get(&self, stage_id: StageId) -> Option<&Arc<dyn ReasoningAgent>> {
        self.agents.get(&stage_id)
    }

    pub fn contains(&self, stage_id: StageId) -> bool {
        self.agents.contains_key(&stage_id)
    }
}

/// Executes single stages against their bound agents
pub struct StageExecutor {
    agents: AgentSet,
}

impl StageExecutor {
    pub fn new(agents: AgentSet) -> Self {
        Self { agents }
    }

    pub fn agents(&self) -> &AgentSet {
        &self.agents
    }

    /// Executes `stage` with the results accumulated in `run`
    ///
    /// The run is only read. Raw and extracted text go to the log buffer.
    pub async fn execute(
        &self,
        stage: &PipelineStage,
        run: &PipelineRun,
        log_buffer: &dyn LogBufferService,
    ) -> AgentOutcome {
        let stage_id = stage.stage_id;

        let Some(agent) = self.agents.get(stage_id) else {
            let message = format!("No agent bound to stage '{}'", stage_id);
            error!("{}", message);
            log_buffer.add_entry(LogEntry::error(Some(stage_id), message.clone()));
            return AgentOutcome::failure(message.clone(), message);
        };

        let input = stage.build_input(&run.context());
        info!("Running stage '{}' with {}", stage_id, agent.persona().role);
        log_buffer.add_entry(LogEntry::info(
            Some(stage_id),
            format!("Starting stage: {}", stage.display_name),
        ));

        match agent.invoke(&input).await {
            Ok(raw_text) => {
                let extracted_text = extract(&raw_text, stage.result_keywords);
                debug!("Stage '{}' raw output: {}", stage_id, raw_text);
                debug!("Stage '{}' extracted: {}", stage_id, extracted_text);

                log_buffer.add_entry(LogEntry::debug(
                    Some(stage_id),
                    format!("Raw output:\n{}", raw_text),
                ));
                log_buffer.add_entry(LogEntry::info(
                    Some(stage_id),
                    format!("Extracted result:\n{}", extracted_text),
                ));

                AgentOutcome::success(raw_text, extracted_text)
            }
            Err(e) => {
                let message = format!("{:#}", e);
                let trace = format!("{:?}", e);
                error!("Stage '{}' failed: {}", stage_id, message);

                log_buffer.add_entry(LogEntry::error(
                    Some(stage_id),
                    format!("Stage '{}' failed: {}\n{}", stage.display_name, message, trace),
                ));

                AgentOutcome::failure(message, trace)
            }
        }
    }
}
