//! Stage-bound reasoning agents
//!
//! Every pipeline stage is bound to one [`ReasoningAgent`]. Agents are opaque
//! fallible calls from the executor's point of view: they take a rendered
//! [`StageInput`] and return free text or an error.

mod classification;
mod llm;
mod persona;

pub use classification::{CLASSIFIER_OUTPUT, ClassificationAgent};
pub use llm::{LanguageModel, LlmAgent, OllamaModel};
pub use persona::AgentPersona;

use async_trait::async_trait;
use neuroscan_core::domain::stage::StageInput;

/// A reasoning agent bound to a pipeline stage
#[async_trait]
pub trait ReasoningAgent: Send + Sync {
    fn persona(&self) -> &AgentPersona;

    /// Runs the agent on one stage input
    async fn invoke(&self, input: &StageInput) -> anyhow::Result<String>;
}
