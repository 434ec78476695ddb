//! Run-scoped mutual exclusion
//!
//! A [`SharedRun`] lets several callers observe a run while at most one of
//! them mutates it. Mutations go through a [`RunLease`]: a private copy of the
//! run that is published back when the lease is dropped. Readers keep seeing
//! the last published state while a long stage is in flight.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{Mutex, OwnedMutexGuard};

use neuroscan_core::PipelineError;
use neuroscan_core::domain::run::PipelineRun;

/// A run shared between concurrent callers
#[derive(Debug)]
pub struct SharedRun {
    busy: Arc<Mutex<()>>,
    state: RwLock<PipelineRun>,
}

impl SharedRun {
    pub fn new(run: PipelineRun) -> Arc<Self> {
        Arc::new(Self {
            busy: Arc::new(Mutex::new(())),
            state: RwLock::new(run),
        })
    }

    /// Last published state of the run
    pub fn snapshot(&self) -> PipelineRun {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a lease is currently held
    pub fn is_busy(&self) -> bool {
        self.busy.try_lock().is_err()
    }

    /// Takes exclusive write access to the run
    ///
    /// Fails with `InvalidStateTransition` instead of waiting when another
    /// caller holds the run.
    pub fn lease(self: &Arc<Self>, action: &str) -> Result<RunLease, PipelineError> {
        let busy = self.busy.clone().try_lock_owned().map_err(|_| {
            PipelineError::InvalidStateTransition(format!(
                "cannot {}: the run is busy with another operation",
                action
            ))
        })?;

        Ok(RunLease {
            _busy: busy,
            run: self.snapshot(),
            shared: self.clone(),
        })
    }
}

/// Exclusive, owned access to a shared run
///
/// Dereferences to the run; changes become visible to readers on drop.
#[derive(Debug)]
pub struct RunLease {
    _busy: OwnedMutexGuard<()>,
    run: PipelineRun,
    shared: Arc<SharedRun>,
}

impl Deref for RunLease {
    type Target = PipelineRun;

    fn deref(&self) -> &PipelineRun {
        &self.run
    }
}

impl DerefMut for RunLease {
    fn deref_mut(&mut self) -> &mut PipelineRun {
        &mut self.run
    }
}

impl Drop for RunLease {
    fn drop(&mut self) {
        let mut state = self
            .shared
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *state = std::mem::take(&mut self.run);
    }
}
