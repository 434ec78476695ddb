//! Model server client
//!
//! Speaks the TensorFlow-Serving REST API: a status endpoint per model and a
//! row-format `:predict` endpoint taking `instances`.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::{handle_response, trim_base_url};

/// State a model version must be in to serve predictions
const AVAILABLE: &str = "AVAILABLE";

/// Loading status of a served model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelStatus {
    #[serde(default)]
    pub model_version_status: Vec<VersionStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionStatus {
    pub version: String,
    pub state: String,
}

impl ModelStatus {
    /// Whether any version of the model can serve predictions
    pub fn is_available(&self) -> bool {
        self.model_version_status.iter().any(|v| v.state == AVAILABLE)
    }
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a, T: Serialize> {
    instances: &'a [T],
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    predictions: Vec<Vec<f32>>,
}

/// Client for one model hosted on a model server
#[derive(Debug, Clone)]
pub struct ModelServerClient {
    base_url: String,
    model: String,
    client: Client,
}

impl ModelServerClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_client(base_url, model, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, model: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: trim_base_url(base_url),
            model: model.into(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Fetch the model's version status
    pub async fn model_status(&self) -> Result<ModelStatus> {
        let url = format!("{}/v1/models/{}", self.base_url, self.model);
        let response = self.client.get(&url).send().await?;

        handle_response(response).await
    }

    /// Run a prediction over a batch of instances
    ///
    /// # Returns
    /// One output row per instance
    pub async fn predict<T: Serialize>(&self, instances: &[T]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/v1/models/{}:predict", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .json(&PredictRequest { instances })
            .send()
            .await?;
        let body: PredictResponse = handle_response(response).await?;

        if body.predictions.len() != instances.len() {
            return Err(ClientError::ParseError(format!(
                "expected {} predictions, got {}",
                instances.len(),
                body.predictions.len()
            )));
        }

        Ok(body.predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_requires_an_available_version() {
        let status: ModelStatus = serde_json::from_value(serde_json::json!({
            "model_version_status": [
                { "version": "1", "state": "LOADING" },
                { "version": "2", "state": "AVAILABLE" }
            ]
        }))
        .unwrap();
        assert!(status.is_available());

        assert!(!ModelStatus::default().is_available());
    }
}
