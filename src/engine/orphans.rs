//! Orphaned Work Pool
//!
//! Shared between every worker loop and the redistribution loop. A worker
//! that becomes unavailable (cooldown, connect/join failure, cancellation)
//! pushes its unprocessed remainder here; the redistribution loop pops in
//! FIFO order so the oldest cooldown is served first.
//!
//! Dispatch is at-most-once: `pop` removes the orphan before any helper
//! starts executing it, so a target is never in two active chunks at a time.

use crate::client::types::{Target, WorkerId};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// The unprocessed remainder of a chunk, awaiting a helper.
///
/// `owner` is always the worker the targets were *originally* assigned to.
/// Re-orphaning by a cooled-down helper keeps the original owner tag, so
/// per-credential attribution stays meaningful across any number of handoffs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOrphan {
    pub owner: WorkerId,
    pub targets: Vec<Target>,
}

/// An idle worker offering itself to the redistribution loop. Sending a
/// `PendingOrphan` through `slot` starts the helper executing it; dropping
/// the handle (or the whole queue) releases the helper instead.
#[derive(Debug)]
pub struct HelperHandle {
    pub worker: WorkerId,
    pub slot: mpsc::Sender<PendingOrphan>,
}

/// FIFO queue of pending orphans, guarded by one lock.
pub struct OrphanPool {
    queue: Mutex<VecDeque<PendingOrphan>>,
}

impl OrphanPool {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(VecDeque::new()),
        })
    }

    pub async fn push(&self, orphan: PendingOrphan) {
        tracing::debug!(
            "Orphaned {} target(s) from worker {}",
            orphan.targets.len(),
            orphan.owner
        );
        let mut queue = self.queue.lock().await;
        queue.push_back(orphan);
    }

    /// Removes and returns the oldest orphan, if any.
    pub async fn pop(&self) -> Option<PendingOrphan> {
        let mut queue = self.queue.lock().await;
        queue.pop_front()
    }

    pub async fn is_empty(&self) -> bool {
        let queue = self.queue.lock().await;
        queue.is_empty()
    }

    pub async fn len(&self) -> usize {
        let queue = self.queue.lock().await;
        queue.len()
    }

    /// Empties the pool. Used at shutdown so stranded targets can be counted
    /// as failed instead of silently dropped.
    pub async fn drain_all(&self) -> Vec<PendingOrphan> {
        let mut queue = self.queue.lock().await;
        queue.drain(..).collect()
    }
}
