//! NeuroScan server API endpoints

use uuid::Uuid;

use crate::error::Result;
use crate::{NeuroScanClient, handle_empty_response, handle_response, handle_text_response};
use neuroscan_core::domain::log::LogEntry;
use neuroscan_core::dto::knowledge::{KnowledgeResponse, TreatmentsResponse};
use neuroscan_core::dto::run::{CreateRun, RunSnapshot, RunSummary, SelectImage};
use neuroscan_core::dto::stage::StageSummary;

impl NeuroScanClient {
    /// Check that the server is up
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        handle_empty_response(response).await
    }

    // =============================================================================
    // Stage Catalogue
    // =============================================================================

    /// List the pipeline stages in execution order
    pub async fn list_stages(&self) -> Result<Vec<StageSummary>> {
        let url = format!("{}/api/stages", self.base_url);
        let response = self.client.get(&url).send().await?;

        handle_response(response).await
    }

    // =============================================================================
    // Run Lifecycle
    // =============================================================================

    /// Create a not-started run for an image
    pub async fn create_run(&self, req: CreateRun) -> Result<RunSnapshot> {
        let url = format!("{}/api/runs", self.base_url);
        let response = self.client.post(&url).json(&req).send().await?;

        handle_response(response).await
    }

    /// List all runs
    pub async fn list_runs(&self) -> Result<Vec<RunSummary>> {
        let url = format!("{}/api/runs", self.base_url);
        let response = self.client.get(&url).send().await?;

        handle_response(response).await
    }

    /// Get a run by ID
    pub async fn get_run(&self, run_id: Uuid) -> Result<RunSnapshot> {
        let url = format!("{}/api/runs/{}", self.base_url, run_id);
        let response = self.client.get(&url).send().await?;

        handle_response(response).await
    }

    /// Delete a run
    ///
    /// Fails with a 409 while another operation holds the run.
    pub async fn delete_run(&self, run_id: Uuid) -> Result<()> {
        let url = format!("{}/api/runs/{}", self.base_url, run_id);
        let response = self.client.delete(&url).send().await?;

        handle_empty_response(response).await
    }

    /// Start a run
    ///
    /// Fails with a 503 when the classifier is unavailable and with a 409 when
    /// the run was already started.
    pub async fn start_run(&self, run_id: Uuid) -> Result<RunSnapshot> {
        self.post_action(run_id, "start").await
    }

    /// Execute the run's current stage
    ///
    /// A stage failure comes back as a 502 carrying the failure message; the
    /// run itself is then marked failed on the server.
    pub async fn advance_run(&self, run_id: Uuid) -> Result<RunSnapshot> {
        self.post_action(run_id, "advance").await
    }

    /// Return a run to its not-started state
    pub async fn reset_run(&self, run_id: Uuid) -> Result<RunSnapshot> {
        self.post_action(run_id, "reset").await
    }

    /// Point a run at another image
    pub async fn select_image(&self, run_id: Uuid, req: SelectImage) -> Result<RunSnapshot> {
        let url = format!("{}/api/runs/{}/image", self.base_url, run_id);
        let response = self.client.put(&url).json(&req).send().await?;

        handle_response(response).await
    }

    async fn post_action(&self, run_id: Uuid, action: &str) -> Result<RunSnapshot> {
        let url = format!("{}/api/runs/{}/{}", self.base_url, run_id, action);
        let response = self.client.post(&url).send().await?;

        handle_response(response).await
    }

    // =============================================================================
    // Run Logs
    // =============================================================================

    /// Get the diagnostic log of a run
    pub async fn get_run_logs(&self, run_id: Uuid) -> Result<Vec<LogEntry>> {
        let url = format!("{}/api/runs/{}/logs", self.base_url, run_id);
        let response = self.client.get(&url).send().await?;

        handle_response(response).await
    }

    /// Get the final report of a completed run
    ///
    /// Fails with a 409 while the run has not completed.
    pub async fn get_run_report(&self, run_id: Uuid) -> Result<String> {
        let url = format!("{}/api/runs/{}/report", self.base_url, run_id);
        let response = self.client.get(&url).send().await?;

        handle_text_response(response).await
    }

    // =============================================================================
    // Knowledge
    // =============================================================================

    /// Search the medical knowledge base
    pub async fn search_knowledge(&self, query: &str) -> Result<KnowledgeResponse> {
        let url = format!("{}/api/knowledge", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("query", query)])
            .send()
            .await?;

        handle_response(response).await
    }

    /// Get the treatments linked to a diagnosis label
    pub async fn treatments_for(&self, label: &str) -> Result<TreatmentsResponse> {
        let url = format!("{}/api/treatments/{}", self.base_url, label);
        let response = self.client.get(&url).send().await?;

        handle_response(response).await
    }
}
