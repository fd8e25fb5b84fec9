//! Run Registry
//!
//! Process-scoped bookkeeping of in-flight runs. Each run gets an id, a start
//! time and a cancellation flag at registration; an external caller (the
//! presentation layer) cancels a specific run through the registry without
//! touching any engine internals. Constructed once and injected wherever
//! needed; there is no ambient global state.

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::types::RunId;

/// Control handle for one in-flight run.
pub struct RunHandle {
    cancel: Arc<AtomicBool>,
    started_at: Instant,
}

impl RunHandle {
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

/// Registry of active runs, keyed by run id.
pub struct RunRegistry {
    runs: DashMap<RunId, RunHandle>,
}

impl RunRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            runs: DashMap::new(),
        })
    }

    /// Registers a new run and returns its id together with the cancellation
    /// flag to hand to the run controller.
    pub fn begin(&self) -> (RunId, Arc<AtomicBool>) {
        let id = RunId::new();
        let cancel = Arc::new(AtomicBool::new(false));
        self.runs.insert(
            id.clone(),
            RunHandle {
                cancel: cancel.clone(),
                started_at: Instant::now(),
            },
        );
        tracing::info!("Registered run {}", id);
        (id, cancel)
    }

    /// Requests cancellation of a run. Returns false for unknown ids.
    pub fn cancel(&self, run: &RunId) -> bool {
        match self.runs.get(run) {
            Some(handle) => {
                handle.cancel.store(true, Ordering::Relaxed);
                tracing::info!("Cancellation requested for run {}", run);
                true
            }
            None => false,
        }
    }

    /// Removes a finished run. Unknown ids are a no-op.
    pub fn finish(&self, run: &RunId) {
        if self.runs.remove(run).is_some() {
            tracing::debug!("Run {} removed from registry", run);
        }
    }

    pub fn is_cancelled(&self, run: &RunId) -> Option<bool> {
        self.runs.get(run).map(|handle| handle.is_cancelled())
    }

    pub fn active_runs(&self) -> usize {
        self.runs.len()
    }
}
