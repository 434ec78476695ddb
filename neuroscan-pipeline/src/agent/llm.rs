use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use neuroscan_client::{ChatMessage, OllamaClient};
use neuroscan_core::domain::stage::StageInput;

use super::{AgentPersona, ReasoningAgent};

/// Text completion backend shared by all agents
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String>;
}

/// Language model served by Ollama
pub struct OllamaModel {
    client: OllamaClient,
}

impl OllamaModel {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LanguageModel for OllamaModel {
    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
        let messages = [ChatMessage::system(system), ChatMessage::user(prompt)];
        self.client
            .chat(&messages)
            .await
            .with_context(|| format!("Ollama model '{}' failed", self.client.model()))
    }
}

/// Agent that answers a stage input with a single language model turn
pub struct LlmAgent {
    persona: AgentPersona,
    model: Arc<dyn LanguageModel>,
}

impl LlmAgent {
    pub fn new(persona: AgentPersona, model: Arc<dyn LanguageModel>) -> Self {
        Self { persona, model }
    }
}

#[async_trait]
impl ReasoningAgent for LlmAgent {
    fn persona(&self) -> &AgentPersona {
        &self.persona
    }

    async fn invoke(&self, input: &StageInput) -> anyhow::Result<String> {
        debug!("{} handling task", self.persona.role);
        let reply = self
            .model
            .complete(&self.persona.system_prompt(), &input.render())
            .await
            .with_context(|| format!("{} could not complete the task", self.persona.role))?;

        if reply.trim().is_empty() {
            anyhow::bail!("{} returned an empty answer", self.persona.role);
        }
        Ok(reply)
    }
}
