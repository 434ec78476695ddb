//! NeuroScan HTTP Clients
//!
//! Typed HTTP clients for every service the NeuroScan pipeline talks to:
//!
//! - [`OllamaClient`]: the local reasoning LLM behind the stage agents
//! - [`ModelServerClient`]: the REST model server hosting the MRI classifier
//! - [`Neo4jClient`]: the treatment knowledge graph
//! - [`NeuroScanClient`]: the NeuroScan server API, used by the CLI
//!
//! # Example
//!
//! ```no_run
//! use neuroscan_client::NeuroScanClient;
//! use neuroscan_core::dto::run::CreateRun;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NeuroScanClient::new("http://localhost:8080");
//!
//!     let snapshot = client.create_run(CreateRun {
//!         image_path: "scans/patient-17.png".into(),
//!     }).await?;
//!
//!     println!("Created run: {}", snapshot.id);
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod error;
pub mod neo4j;
pub mod ollama;
mod runs;

// Re-export commonly used types
pub use classifier::{ModelServerClient, ModelStatus};
pub use error::{ClientError, Result};
pub use neo4j::{GraphEdge, Neo4jClient, Statement};
pub use ollama::{ChatMessage, OllamaClient};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the NeuroScan server API
///
/// Methods are grouped by resource:
/// - Stage catalogue
/// - Run lifecycle (create, start, advance, reset, image selection)
/// - Run logs
/// - Knowledge lookups
#[derive(Debug, Clone)]
pub struct NeuroScanClient {
    /// Base URL of the server (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl NeuroScanClient {
    /// Create a new server client
    ///
    /// # Example
    /// ```
    /// use neuroscan_client::NeuroScanClient;
    ///
    /// let client = NeuroScanClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new server client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: trim_base_url(base_url),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

pub(crate) fn trim_base_url(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}

// =============================================================================
// Response Handlers
// =============================================================================

/// Handle a response and deserialize JSON
///
/// Checks the status code and returns an appropriate error if the request
/// failed, or deserializes the response body if successful.
pub(crate) async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = check_status(response).await?;

    response
        .json()
        .await
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
}

/// Handle a response that returns no content
pub(crate) async fn handle_empty_response(response: reqwest::Response) -> Result<()> {
    check_status(response).await.map(|_| ())
}

/// Handle a response with a plain text body
pub(crate) async fn handle_text_response(response: reqwest::Response) -> Result<String> {
    let response = check_status(response).await?;
    Ok(response.text().await?)
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_message(&error_text)));
    }

    Ok(response)
}

/// Pulls the message out of `{"error": "..."}` bodies, else keeps the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
