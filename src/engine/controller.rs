//! Run Controller
//!
//! Owns one end-to-end run: builds the distribution, spawns every worker
//! loop and the redistribution loop, waits for the own-share phase to finish
//! everywhere, drains remaining orphans, tears everything down and emits the
//! final report.
//!
//! ## Error policy
//! Individual connect/join/invite failures never escape a worker loop; they
//! become counters and statuses at the point of occurrence. The only
//! run-level failure is the total absence of usable workers. A cancelled run
//! still reports the counters actually reached, and orphans nobody picked up
//! are counted as failed, never dropped.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::client::types::{Credential, Target};
use crate::client::Connector;
use crate::distributor::DistributionPlan;
use crate::progress::types::{RunReport, WorkerStatus};
use crate::progress::{ProgressBoard, ProgressSink};

use super::orphans::OrphanPool;
use super::redistributor::run_redistributor;
use super::types::RunConfig;
use super::worker::{run_worker, WorkerContext};

pub struct RunController<C: Connector> {
    connector: Arc<C>,
    config: Arc<RunConfig>,
}

impl<C: Connector> RunController<C> {
    pub fn new(connector: Arc<C>, config: RunConfig) -> Self {
        Self {
            connector,
            config: Arc::new(config),
        }
    }

    /// Drives one run to completion or cancellation and returns the final
    /// report. The same report is also published through the sink.
    pub async fn run(
        &self,
        credentials: Vec<Credential>,
        targets: Vec<Target>,
        sink: Arc<dyn ProgressSink>,
        cancel: Arc<AtomicBool>,
    ) -> Result<RunReport> {
        let board = ProgressBoard::new(sink, self.config.publish_interval);

        // Degenerate inputs mean "nothing to do", not a failure.
        if credentials.is_empty() || targets.is_empty() {
            tracing::info!(
                "Nothing to do: {} credential(s), {} target(s)",
                credentials.len(),
                targets.len()
            );
            return Ok(board.finalize().await);
        }

        let worker_count = credentials.len();
        let plan = DistributionPlan::build(&targets, worker_count, self.config.chunk_size);
        let summary = plan.summary(self.config.delay);
        tracing::info!(
            "Distributing {} targets across {} workers ({} each, {} with one extra, ~{}s estimated)",
            summary.total_targets,
            summary.workers,
            summary.base_per_worker,
            summary.extra,
            summary.estimated.as_secs()
        );

        for credential in &credentials {
            board.register(credential.worker_id()).await;
        }
        board.publish_progress(true).await;

        let orphans = OrphanPool::new();
        let shutdown = Arc::new(AtomicBool::new(false));
        let (helper_tx, helper_rx) = mpsc::channel(worker_count);
        let (done_tx, mut done_rx) = mpsc::channel(worker_count);

        let redistributor = tokio::spawn(run_redistributor(
            orphans.clone(),
            helper_rx,
            shutdown.clone(),
            self.config.poll_interval,
        ));

        let mut worker_tasks = Vec::with_capacity(worker_count);
        for (credential, share) in credentials.into_iter().zip(plan.into_shares()) {
            let ctx = WorkerContext {
                board: board.clone(),
                orphans: orphans.clone(),
                helpers: helper_tx.clone(),
                own_share_done: done_tx.clone(),
                cancel: cancel.clone(),
                config: self.config.clone(),
            };
            worker_tasks.push(tokio::spawn(run_worker(
                self.connector.clone(),
                credential,
                share,
                ctx,
            )));
        }
        drop(helper_tx);
        drop(done_tx);

        // Phase 1: every worker finishes its own share (completed, cooled
        // down or errored). The tasks themselves may live on as helpers.
        let mut finished = 0;
        while finished < worker_count {
            match done_rx.recv().await {
                Some(id) => {
                    tracing::debug!("Worker {} finished its own share", id);
                    finished += 1;
                }
                None => break,
            }
        }

        // Phase 2: drain the orphan pool. Helpers keep consuming it; we stop
        // early when nobody is left who could pick work up, or when the
        // post-cancellation grace elapses.
        let mut grace_deadline: Option<Instant> = None;
        loop {
            if orphans.is_empty().await {
                break;
            }
            if cancel.load(Ordering::Relaxed) && grace_deadline.is_none() {
                tracing::info!(
                    "Cancellation requested; draining orphans for up to {}s",
                    self.config.drain_grace.as_secs()
                );
                grace_deadline = Some(Instant::now() + self.config.drain_grace);
            }
            if let Some(deadline) = grace_deadline {
                if Instant::now() >= deadline {
                    tracing::warn!("Drain grace elapsed with orphans still pending");
                    break;
                }
            }
            if !board.any_active().await {
                tracing::warn!(
                    "No worker left to pick up {} pending orphan(s)",
                    orphans.len().await
                );
                break;
            }
            board.publish_progress(false).await;
            tokio::time::sleep(self.config.poll_interval).await;
        }

        // Teardown: stop redistribution, release idle helpers, then wait for
        // every worker task to disconnect and exit.
        shutdown.store(true, Ordering::Relaxed);
        if let Err(e) = redistributor.await {
            tracing::error!("Redistribution task failed: {}", e);
        }
        for task in worker_tasks {
            if let Err(e) = task.await {
                tracing::error!("Worker task failed: {}", e);
            }
        }

        // Whatever remains was dispatched but never redispatched; count it as
        // failed under its owner so invited + failed covers every dispatched
        // target.
        for orphan in orphans.drain_all().await {
            tracing::warn!(
                "Counting {} stranded target(s) from {} as failed",
                orphan.targets.len(),
                orphan.owner
            );
            board.add_failed(&orphan.owner, orphan.targets.len() as u64).await;
        }

        let report = board.finalize().await;

        let all_errored = report
            .workers
            .iter()
            .all(|line| matches!(line.final_status, WorkerStatus::Errored { .. }));
        if report.total_invited == 0 && all_errored {
            anyhow::bail!("no account could perform any operation");
        }

        tracing::info!(
            "Run finished: {} invited, {} failed, {}% success in {}s",
            report.total_invited,
            report.total_failed,
            report.success_rate,
            report.duration_secs
        );
        Ok(report)
    }
}
