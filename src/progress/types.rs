use crate::client::types::WorkerId;
use serde::{Deserialize, Serialize};

/// Where a worker currently is in its lifecycle.
///
/// `Cooldown`, `Errored` and `Disconnected` are terminal for the run: the
/// engine never resumes a cooled-down worker after its wait elapses, it
/// permanently reassigns the remainder instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum WorkerStatus {
    /// Establishing the connection for this credential.
    Connecting,
    /// Attempting to join the destination group.
    JoiningGroup,
    /// Working through its own assigned chunks.
    Processing,
    /// Rate-limited by the remote service; its remainder has been orphaned.
    Cooldown { wait_secs: u64 },
    /// Finished its own share; queued as an idle helper.
    HelperAvailable,
    /// Processing an orphan on behalf of `owner`; counters go to the owner.
    Helping { owner: WorkerId },
    /// Connection released; clean end of participation.
    Disconnected,
    /// Could not participate (connect or join failure).
    Errored { reason: String },
}

impl WorkerStatus {
    /// Whether this worker can still perform or pick up work in this run.
    pub fn is_active(&self) -> bool {
        !matches!(
            self,
            WorkerStatus::Cooldown { .. }
                | WorkerStatus::Errored { .. }
                | WorkerStatus::Disconnected
        )
    }
}

impl std::fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerStatus::Connecting => write!(f, "connecting"),
            WorkerStatus::JoiningGroup => write!(f, "joining group"),
            WorkerStatus::Processing => write!(f, "processing"),
            WorkerStatus::Cooldown { wait_secs } => write!(f, "cooldown ({}s)", wait_secs),
            WorkerStatus::HelperAvailable => write!(f, "helper available"),
            WorkerStatus::Helping { owner } => write!(f, "helping {}", owner),
            WorkerStatus::Disconnected => write!(f, "disconnected"),
            WorkerStatus::Errored { reason } => write!(f, "error: {}", reason),
        }
    }
}

/// Per-worker counters and status. Mutated only while the progress board's
/// lock is held.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressRecord {
    pub invited: u64,
    pub failed: u64,
    pub status: WorkerStatus,
}

impl ProgressRecord {
    pub fn new() -> Self {
        Self {
            invited: 0,
            failed: 0,
            status: WorkerStatus::Connecting,
        }
    }
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// A consistent point-in-time view of every worker's record, sorted by
/// worker id for stable rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub workers: Vec<(WorkerId, ProgressRecord)>,
    pub elapsed_secs: u64,
}

impl ProgressSnapshot {
    pub fn total_invited(&self) -> u64 {
        self.workers.iter().map(|(_, r)| r.invited).sum()
    }

    pub fn total_failed(&self) -> u64 {
        self.workers.iter().map(|(_, r)| r.failed).sum()
    }
}

/// Final per-worker line of the run report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerReport {
    pub worker: WorkerId,
    pub invited: u64,
    pub failed: u64,
    pub success_rate: f64,
    pub final_status: WorkerStatus,
}

/// The structured final report delivered to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub workers: Vec<WorkerReport>,
    pub total_invited: u64,
    pub total_failed: u64,
    pub success_rate: f64,
    pub duration_secs: u64,
}

/// Percentage of successes over all attempted operations, rounded to two
/// decimals. Zero attempts yield 0.0.
pub fn success_rate(invited: u64, failed: u64) -> f64 {
    let total = invited + failed;
    if total == 0 {
        return 0.0;
    }
    let rate = invited as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}
