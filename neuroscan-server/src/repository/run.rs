//! Run Repository
//!
//! In-memory registry of pipeline runs keyed by id.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

use neuroscan_core::domain::run::PipelineRun;
use neuroscan_core::dto::run::{RunFailure, RunSnapshot};
use neuroscan_pipeline::{InMemoryLogBuffer, PipelineController, SharedRun};

/// A stored run with its diagnostic log
#[derive(Debug)]
pub struct RunRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub shared: Arc<SharedRun>,
    pub logs: InMemoryLogBuffer,
    last_error: RwLock<Option<RunFailure>>,
}

impl RunRecord {
    fn new(run: PipelineRun) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            shared: SharedRun::new(run),
            logs: InMemoryLogBuffer::new(),
            last_error: RwLock::new(None),
        }
    }

    pub fn last_error(&self) -> Option<RunFailure> {
        self.last_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_last_error(&self, failure: Option<RunFailure>) {
        *self
            .last_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = failure;
    }

    /// Full view of the last published state
    pub fn snapshot(&self, controller: &PipelineController) -> RunSnapshot {
        let run = self.shared.snapshot();
        RunSnapshot {
            id: self.id,
            progress: controller.progress(&run),
            run,
            last_error: self.last_error(),
        }
    }
}

/// In-memory run registry
#[derive(Debug, Default)]
pub struct RunRepository {
    runs: RwLock<HashMap<Uuid, Arc<RunRecord>>>,
}

impl RunRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new run and returns its record
    pub fn create(&self, run: PipelineRun) -> Arc<RunRecord> {
        let record = Arc::new(RunRecord::new(run));
        self.runs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record.id, record.clone());
        record
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<Arc<RunRecord>> {
        self.runs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Removes a run; returns it if it existed
    pub fn delete(&self, id: Uuid) -> Option<Arc<RunRecord>> {
        self.runs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    /// Every run, newest first
    pub fn list(&self) -> Vec<Arc<RunRecord>> {
        let mut runs: Vec<_> = self
            .runs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_then_find() {
        let repo = RunRepository::new();
        let record = repo.create(PipelineRun::new("scan.png"));

        let found = repo.find_by_id(record.id).unwrap();
        assert_eq!(found.id, record.id);
        assert!(repo.find_by_id(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_delete_removes_run() {
        let repo = RunRepository::new();
        let record = repo.create(PipelineRun::new("scan.png"));

        assert!(repo.delete(record.id).is_some());
        assert!(repo.find_by_id(record.id).is_none());
        assert!(repo.delete(record.id).is_none());
    }

    #[test]
    fn test_list_is_newest_first() {
        let repo = RunRepository::new();
        let first = repo.create(PipelineRun::new("a.png"));
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = repo.create(PipelineRun::new("b.png"));

        let ids: Vec<_> = repo.list().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }
}
