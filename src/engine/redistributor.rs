//! Redistribution Loop
//!
//! A single long-lived loop per run that matches idle helpers against pending
//! orphans. It owns no state of its own: it reads the shared orphan pool and
//! the helper queue, and hands each oldest orphan to the next idle worker.
//!
//! While the pool is empty it sleeps for the poll interval instead of
//! spinning. While an orphan is pending it blocks on the helper queue, waking
//! at the poll interval to observe the shutdown flag so it can never leave an
//! orphan stranded past shutdown (the controller drains and accounts for the
//! pool after this loop exits).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use super::orphans::{HelperHandle, OrphanPool};

pub(crate) async fn run_redistributor(
    orphans: Arc<OrphanPool>,
    mut helpers: mpsc::Receiver<HelperHandle>,
    shutdown: Arc<AtomicBool>,
    poll_interval: Duration,
) {
    tracing::debug!("Redistribution loop started");

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        if orphans.is_empty().await {
            tokio::time::sleep(poll_interval).await;
            continue;
        }

        // An orphan is waiting: block for the next idle helper.
        let handle = match tokio::time::timeout(poll_interval, helpers.recv()).await {
            Ok(Some(handle)) => handle,
            // Every worker loop has ended; nobody can help anymore.
            Ok(None) => break,
            // No helper yet; re-check the shutdown flag.
            Err(_) => continue,
        };

        if let Some(orphan) = orphans.pop().await {
            let owner = orphan.owner.clone();
            let count = orphan.targets.len();
            match handle.slot.send(orphan).await {
                Ok(()) => {
                    tracing::info!(
                        "Assigned {} orphaned target(s) from {} to helper {}",
                        count,
                        owner,
                        handle.worker
                    );
                }
                Err(send_err) => {
                    // Helper vanished between registering and assignment;
                    // the work goes back to the pool.
                    tracing::warn!("Helper {} gone; re-queueing orphan", handle.worker);
                    orphans.push(send_err.0).await;
                }
            }
        }
    }

    tracing::debug!("Redistribution loop stopped");
}
