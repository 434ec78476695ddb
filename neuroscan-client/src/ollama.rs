//! Ollama chat API client
//!
//! Non-streaming access to a local Ollama server. Only the two endpoints the
//! pipeline needs are covered: `/api/chat` for agent turns and `/api/tags` for
//! availability checks.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ClientError, Result};
use crate::{handle_response, trim_base_url};

/// One message of a chat exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Client for one model on an Ollama server
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    temperature: f32,
    client: Client,
}

impl OllamaClient {
    /// Create a client for `model` with the given sampling temperature
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, temperature: f32) -> Self {
        Self::with_client(base_url, model, temperature, Client::new())
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(
        base_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, model, temperature, client))
    }

    pub fn with_client(
        base_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        client: Client,
    ) -> Self {
        Self {
            base_url: trim_base_url(base_url),
            model: model.into(),
            temperature,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a chat exchange and return the assistant's reply
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
            },
        };

        tracing::debug!(model = %self.model, messages = messages.len(), "Sending chat request");
        let response = self.client.post(&url).json(&request).send().await?;
        let body: ChatResponse = handle_response(response).await?;

        body.message
            .map(|m| m.content)
            .ok_or_else(|| ClientError::ParseError("No message content in response".to_string()))
    }

    /// List the models installed on the server
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().await?;
        let body: TagsResponse = handle_response(response).await?;

        Ok(body.models.into_iter().map(|m| m.name).collect())
    }

    /// Check that the server answers and has the configured model installed
    pub async fn is_available(&self) -> bool {
        match self.list_models().await {
            Ok(models) => models.iter().any(|m| m == &self.model),
            Err(e) => {
                tracing::debug!("Ollama unavailable at {}: {}", self.base_url, e);
                false
            }
        }
    }
}
