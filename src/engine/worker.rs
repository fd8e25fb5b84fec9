//! Worker Execution Loop
//!
//! One loop per credentialed account, spawned by the run controller. Drives
//! the worker through its lifecycle:
//!
//! `Connecting -> JoiningGroup -> Processing -> {Cooldown | HelperAvailable |
//! Helping | Disconnected | Errored}`
//!
//! A rate-limit signal is a scheduling event, not an error: the loop stops
//! immediately, orphans every unprocessed target of its share and ends the
//! worker's active participation. The worker is not resumed when its
//! advertised wait elapses; its remainder is permanently reassigned.
//!
//! While helping, counters are attributed to the orphan's *original* owner,
//! never to the helper, so per-credential statistics stay meaningful for
//! quota auditing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::client::types::{Credential, GroupRef, InviteOutcome, JoinOutcome, Target, WorkerId};
use crate::client::{Connector, GroupClient};
use crate::distributor::types::Share;
use crate::progress::types::WorkerStatus;
use crate::progress::ProgressBoard;

use super::orphans::{HelperHandle, OrphanPool, PendingOrphan};
use super::types::RunConfig;

/// One credentialed actor: its identity plus the exclusively-owned
/// connection handle.
pub(crate) struct Worker<C: GroupClient> {
    id: WorkerId,
    client: Option<C>,
}

impl<C: GroupClient> Worker<C> {
    pub(crate) fn new(id: WorkerId, client: C) -> Self {
        Self {
            id,
            client: Some(client),
        }
    }

    async fn join_group(&mut self, group: &GroupRef) -> anyhow::Result<JoinOutcome> {
        match self.client.as_mut() {
            Some(client) => client.join_group(group).await,
            None => Err(anyhow::anyhow!("connection already released")),
        }
    }

    async fn invite(&mut self, group: &GroupRef, target: &Target) -> InviteOutcome {
        match self.client.as_mut() {
            Some(client) => client.invite(group, target).await,
            None => InviteOutcome::Failed {
                reason: "connection already released".to_string(),
            },
        }
    }

    /// Releases the connection exactly once. Safe to call again; repeat
    /// calls are no-ops.
    pub(crate) async fn disconnect(&mut self) {
        if let Some(mut client) = self.client.take() {
            client.disconnect().await;
            tracing::debug!("Worker {} disconnected", self.id);
        }
    }
}

/// Shared run wiring handed to every worker loop.
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub board: Arc<ProgressBoard>,
    pub orphans: Arc<OrphanPool>,
    pub helpers: mpsc::Sender<HelperHandle>,
    /// Signals the controller that this worker's own-share phase is over
    /// (completed, cooled down or errored). The task itself may live on as a
    /// helper after sending this.
    pub own_share_done: mpsc::Sender<WorkerId>,
    pub cancel: Arc<AtomicBool>,
    pub config: Arc<RunConfig>,
}

/// How one batch of targets ended.
enum BatchOutcome {
    Completed,
    RateLimited { wait_secs: u64, remaining: Vec<Target> },
    Cancelled { remaining: Vec<Target> },
}

/// The full lifecycle of one worker, from connect to disconnect.
pub(crate) async fn run_worker<C: Connector>(
    connector: Arc<C>,
    credential: Credential,
    share: Share,
    ctx: WorkerContext,
) {
    let id = credential.worker_id();

    // Connecting
    let client = match connector.connect(&credential).await {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Worker {} failed to connect: {}", id, e);
            fail_out(&ctx, &id, share, e.to_string()).await;
            return;
        }
    };
    let mut worker = Worker::new(id.clone(), client);

    // JoiningGroup
    ctx.board.set_status(&id, WorkerStatus::JoiningGroup).await;
    match worker.join_group(&ctx.config.group).await {
        Ok(JoinOutcome::Joined) => {
            tracing::info!("Worker {} joined group {}", id, ctx.config.group);
        }
        Ok(JoinOutcome::AlreadyMember) => {
            tracing::debug!("Worker {} already a member of {}", id, ctx.config.group);
        }
        Err(e) => {
            tracing::warn!("Worker {} failed to join {}: {}", id, ctx.config.group, e);
            worker.disconnect().await;
            fail_out(&ctx, &id, share, e.to_string()).await;
            return;
        }
    }

    // Processing: own share, chunk by chunk, in list order.
    ctx.board.set_status(&id, WorkerStatus::Processing).await;
    let mut chunks = share.chunks.into_iter();
    let mut completed_own_share = true;

    while let Some(chunk) = chunks.next() {
        match process_batch(&mut worker, &id, chunk, &ctx).await {
            BatchOutcome::Completed => continue,
            BatchOutcome::RateLimited { wait_secs, remaining } => {
                tracing::warn!(
                    "Worker {} rate limited for {}s; handing off its remainder",
                    id,
                    wait_secs
                );
                orphan_remainder(&ctx, &id, remaining, chunks.by_ref()).await;
                ctx.board
                    .set_status(&id, WorkerStatus::Cooldown { wait_secs })
                    .await;
                ctx.board.publish_progress(true).await;
                completed_own_share = false;
                break;
            }
            BatchOutcome::Cancelled { remaining } => {
                tracing::info!("Worker {} stopping on cancellation", id);
                orphan_remainder(&ctx, &id, remaining, chunks.by_ref()).await;
                completed_own_share = false;
                break;
            }
        }
    }

    let _ = ctx.own_share_done.send(id.clone()).await;

    // Helping: only a worker that cleanly finished its own share offers
    // itself to the redistribution loop.
    if completed_own_share && !ctx.cancel.load(Ordering::Relaxed) {
        helper_phase(&mut worker, &id, &ctx).await;
    }

    worker.disconnect().await;

    // Cooldown and error statuses stay visible in the final report; only a
    // clean exit is reported as disconnected.
    match ctx.board.status_of(&id).await {
        Some(WorkerStatus::Cooldown { .. }) | Some(WorkerStatus::Errored { .. }) => {}
        _ => ctx.board.set_status(&id, WorkerStatus::Disconnected).await,
    }
}

/// Connect/join failure: the worker is excluded from the run and its entire
/// share goes to the orphan pool so peers can absorb it.
async fn fail_out(ctx: &WorkerContext, id: &WorkerId, share: Share, reason: String) {
    for chunk in share.chunks {
        if !chunk.is_empty() {
            ctx.orphans
                .push(PendingOrphan {
                    owner: id.clone(),
                    targets: chunk,
                })
                .await;
        }
    }
    ctx.board
        .set_status(id, WorkerStatus::Errored { reason })
        .await;
    ctx.board.publish_progress(true).await;
    let _ = ctx.own_share_done.send(id.clone()).await;
}

/// Pushes the unprocessed suffix of the current chunk plus every untouched
/// chunk, preserving list order and the owner tag.
async fn orphan_remainder(
    ctx: &WorkerContext,
    owner: &WorkerId,
    remaining: Vec<Target>,
    untouched: impl Iterator<Item = Vec<Target>>,
) {
    if !remaining.is_empty() {
        ctx.orphans
            .push(PendingOrphan {
                owner: owner.clone(),
                targets: remaining,
            })
            .await;
    }
    for chunk in untouched {
        if !chunk.is_empty() {
            ctx.orphans
                .push(PendingOrphan {
                    owner: owner.clone(),
                    targets: chunk,
                })
                .await;
        }
    }
}

/// Invites each target in order with the configured delay in between.
///
/// `owner` is the worker the counters are attributed to: the worker itself
/// during its own share, the orphan's original owner while helping.
async fn process_batch<C: GroupClient>(
    worker: &mut Worker<C>,
    owner: &WorkerId,
    targets: Vec<Target>,
    ctx: &WorkerContext,
) -> BatchOutcome {
    for (index, target) in targets.iter().enumerate() {
        // Checked at the top of every iteration: an in-flight invite always
        // finishes, but no new one starts after cancellation.
        if ctx.cancel.load(Ordering::Relaxed) {
            return BatchOutcome::Cancelled {
                remaining: targets[index..].to_vec(),
            };
        }

        match worker.invite(&ctx.config.group, target).await {
            InviteOutcome::Invited => {
                tracing::debug!("Invited {}", target);
                ctx.board.record_invited(owner).await;
            }
            InviteOutcome::NotFound => {
                tracing::debug!("No account found for {}", target);
                ctx.board.record_failed(owner).await;
            }
            InviteOutcome::Failed { reason } => {
                tracing::debug!("Failed to invite {}: {}", target, reason);
                ctx.board.record_failed(owner).await;
            }
            InviteOutcome::RateLimited { wait_secs } => {
                // The current target was not invited; it leads the remainder.
                return BatchOutcome::RateLimited {
                    wait_secs,
                    remaining: targets[index..].to_vec(),
                };
            }
        }

        ctx.board.publish_progress(false).await;
        tokio::time::sleep(ctx.config.delay).await;
    }

    BatchOutcome::Completed
}

/// Idle phase: the worker queues itself as a helper and executes whatever
/// orphans the redistribution loop sends it, until released or cooled down.
async fn helper_phase<C: GroupClient>(worker: &mut Worker<C>, id: &WorkerId, ctx: &WorkerContext) {
    loop {
        // A fresh slot per registration. The handle owns the only sender,
        // so when the redistribution loop shuts down and drops it, `recv`
        // wakes with `None` and the helper is released.
        let (slot_tx, mut slot_rx) = mpsc::channel::<PendingOrphan>(1);

        // Status flips to available before the handle is visible to the
        // redistribution loop, so the worker is never observable as both
        // idle and mid-mutation.
        ctx.board.set_status(id, WorkerStatus::HelperAvailable).await;
        if ctx
            .helpers
            .send(HelperHandle {
                worker: id.clone(),
                slot: slot_tx,
            })
            .await
            .is_err()
        {
            // Redistribution already shut down; nothing left to help with.
            return;
        }

        let orphan = match slot_rx.recv().await {
            Some(orphan) => orphan,
            None => return,
        };

        if ctx.cancel.load(Ordering::Relaxed) {
            ctx.orphans.push(orphan).await;
            return;
        }

        let owner = orphan.owner.clone();
        tracing::info!(
            "Worker {} helping with {} target(s) from {}",
            id,
            orphan.targets.len(),
            owner
        );
        ctx.board
            .set_status(id, WorkerStatus::Helping { owner: owner.clone() })
            .await;

        match process_batch(worker, &owner, orphan.targets, ctx).await {
            BatchOutcome::Completed => continue,
            BatchOutcome::RateLimited { wait_secs, remaining } => {
                tracing::warn!("Helper {} rate limited for {}s", id, wait_secs);
                // Back to the pool with the original owner tag, never
                // re-tagged to the helper.
                orphan_remainder(ctx, &owner, remaining, std::iter::empty()).await;
                ctx.board
                    .set_status(id, WorkerStatus::Cooldown { wait_secs })
                    .await;
                ctx.board.publish_progress(true).await;
                return;
            }
            BatchOutcome::Cancelled { remaining } => {
                orphan_remainder(ctx, &owner, remaining, std::iter::empty()).await;
                return;
            }
        }
    }
}
