//! Work Distribution
//!
//! Splits an ordered target list into per-worker shares, and each share into
//! small fixed-size chunks for incremental, interruptible processing.
//!
//! ## Contract
//! - Shares partition the input with no gaps or overlaps, in original order.
//! - `len(share_i) = floor(N/M) + 1` for the first `N mod M` shares,
//!   `floor(N/M)` for the rest, so share lengths differ by at most one.
//! - The split is deterministic for a given input.
//! - `N = 0` or `M = 0` yields an empty plan; the run controller treats that
//!   as "nothing to do", not a failure.

pub mod types;


use crate::client::types::Target;
use std::time::Duration;

use types::{PlanSummary, Share};

/// Default number of targets per chunk. Small, so a cooldown interrupts at
/// most this many in-flight targets.
pub const DEFAULT_CHUNK_SIZE: usize = 5;

/// The complete assignment of a target list to a worker pool.
#[derive(Debug, Clone)]
pub struct DistributionPlan {
    shares: Vec<Share>,
    total_targets: usize,
}

impl DistributionPlan {
    /// Builds the plan for `workers` workers over the given target list.
    ///
    /// `chunk_size` must be at least 1; callers normally pass
    /// [`DEFAULT_CHUNK_SIZE`].
    pub fn build(targets: &[Target], workers: usize, chunk_size: usize) -> Self {
        assert!(chunk_size >= 1, "chunk_size must be at least 1");

        if targets.is_empty() || workers == 0 {
            return Self {
                shares: vec![Share { chunks: Vec::new() }; workers],
                total_targets: 0,
            };
        }

        let base = targets.len() / workers;
        let extra = targets.len() % workers;

        let mut shares = Vec::with_capacity(workers);
        let mut start = 0;
        for i in 0..workers {
            let count = base + usize::from(i < extra);
            let slice = &targets[start..start + count];
            let chunks = slice
                .chunks(chunk_size)
                .map(|chunk| chunk.to_vec())
                .collect();
            shares.push(Share { chunks });
            start += count;
        }

        Self {
            shares,
            total_targets: targets.len(),
        }
    }

    /// Consumes the plan, yielding one share per worker in worker order.
    pub fn into_shares(self) -> Vec<Share> {
        self.shares
    }

    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    pub fn total_targets(&self) -> usize {
        self.total_targets
    }

    /// Distribution preview: per-worker counts and a rough duration estimate
    /// for the given inter-invite delay.
    pub fn summary(&self, delay: Duration) -> PlanSummary {
        let workers = self.shares.len();
        let base = if workers == 0 {
            0
        } else {
            self.total_targets / workers
        };
        let extra = if workers == 0 {
            0
        } else {
            self.total_targets % workers
        };

        // The longest share bounds the run; each invite costs the delay plus
        // roughly two seconds of remote round-trips.
        let longest = base + usize::from(extra > 0);
        let per_invite = delay + Duration::from_secs(2);
        let estimated = per_invite * longest as u32;

        PlanSummary {
            total_targets: self.total_targets,
            workers,
            base_per_worker: base,
            extra,
            estimated,
        }
    }
}
