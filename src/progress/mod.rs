//! Progress Aggregation
//!
//! Holds every worker's counters and status under one shared lock and renders
//! rate-limited human-readable snapshots through a caller-supplied sink.
//!
//! ## Responsibilities
//! - **Recording**: counter and status mutations from all worker loops, each
//!   taken under the board's lock.
//! - **Snapshots**: consistent multi-worker reads under the same lock.
//! - **Rendering**: publishing progress text at most once per configured
//!   interval; `force` callers (start, cooldown, completion) always bypass
//!   the limit. Skipped renders lose nothing: the counters stay authoritative.

pub mod report;
pub mod types;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::client::types::WorkerId;
use types::{ProgressRecord, ProgressSnapshot, RunReport, WorkerStatus};

/// Receives rendered progress and report text together with the structured
/// snapshot it was built from. The transport behind it (chat message edit,
/// log line, HTTP push) is the caller's business.
#[async_trait]
pub trait ProgressSink: Send + Sync + 'static {
    async fn publish(&self, text: &str, snapshot: &ProgressSnapshot);
}

/// Shared per-run progress state.
pub struct ProgressBoard {
    records: Mutex<HashMap<WorkerId, ProgressRecord>>,
    last_publish: Mutex<Option<Instant>>,
    min_publish_interval: Duration,
    started_at: Instant,
    sink: Arc<dyn ProgressSink>,
}

impl ProgressBoard {
    pub fn new(sink: Arc<dyn ProgressSink>, min_publish_interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(HashMap::new()),
            last_publish: Mutex::new(None),
            min_publish_interval,
            started_at: Instant::now(),
            sink,
        })
    }

    /// Adds a worker with zeroed counters in the `Connecting` state.
    pub async fn register(&self, worker: WorkerId) {
        let mut records = self.records.lock().await;
        records.insert(worker, ProgressRecord::new());
    }

    /// Credits one successful invitation to `owner`. During helping, `owner`
    /// is the orphan's original worker, not the helper.
    pub async fn record_invited(&self, owner: &WorkerId) {
        let mut records = self.records.lock().await;
        if let Some(record) = records.get_mut(owner) {
            record.invited += 1;
        }
    }

    /// Counts one failed target against `owner`.
    pub async fn record_failed(&self, owner: &WorkerId) {
        self.add_failed(owner, 1).await;
    }

    /// Counts `count` failed targets against `owner`. Used for stranded
    /// orphans at shutdown, so every dispatched target stays accounted for.
    pub async fn add_failed(&self, owner: &WorkerId, count: u64) {
        let mut records = self.records.lock().await;
        if let Some(record) = records.get_mut(owner) {
            record.failed += count;
        }
    }

    pub async fn set_status(&self, worker: &WorkerId, status: WorkerStatus) {
        let mut records = self.records.lock().await;
        if let Some(record) = records.get_mut(worker) {
            tracing::debug!("Worker {} status: {} -> {}", worker, record.status, status);
            record.status = status;
        }
    }

    pub async fn status_of(&self, worker: &WorkerId) -> Option<WorkerStatus> {
        let records = self.records.lock().await;
        records.get(worker).map(|record| record.status.clone())
    }

    /// Whether any worker is still in a state from which it could perform or
    /// pick up work.
    pub async fn any_active(&self) -> bool {
        let records = self.records.lock().await;
        records.values().any(|record| record.status.is_active())
    }

    /// Takes a consistent view of all records, sorted by worker id.
    pub async fn snapshot(&self) -> ProgressSnapshot {
        let records = self.records.lock().await;
        let mut workers: Vec<(WorkerId, ProgressRecord)> = records
            .iter()
            .map(|(worker, record)| (worker.clone(), record.clone()))
            .collect();
        workers.sort_by(|a, b| a.0 .0.cmp(&b.0 .0));

        ProgressSnapshot {
            workers,
            elapsed_secs: self.started_at.elapsed().as_secs(),
        }
    }

    /// Publishes a progress render unless one went out within the minimum
    /// interval. `force` bypasses the interval check.
    pub async fn publish_progress(&self, force: bool) {
        {
            let mut last = self.last_publish.lock().await;
            if !force {
                if let Some(at) = *last {
                    if at.elapsed() < self.min_publish_interval {
                        return;
                    }
                }
            }
            *last = Some(Instant::now());
        }

        let snapshot = self.snapshot().await;
        let text = report::render_progress(&snapshot);
        self.sink.publish(&text, &snapshot).await;
    }

    /// Builds the final report, publishes its render (always forced) and
    /// hands the structured report back.
    pub async fn finalize(&self) -> RunReport {
        let snapshot = self.snapshot().await;
        let run_report = report::build_report(&snapshot);
        let text = report::render_final(&run_report);
        self.sink.publish(&text, &snapshot).await;
        run_report
    }
}
