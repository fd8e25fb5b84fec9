use crate::client::types::Target;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One worker's portion of the target list, pre-cut into small chunks.
///
/// Chunks are the unit of reassignment: when a worker becomes unavailable
/// mid-chunk, only the unprocessed remainder of that one chunk (plus any
/// untouched chunks) moves to another worker, never already-completed targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    pub chunks: Vec<Vec<Target>>,
}

impl Share {
    /// Total number of targets across all chunks.
    pub fn len(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Preview of a distribution, shown to the caller before a run starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanSummary {
    pub total_targets: usize,
    pub workers: usize,
    /// Targets every worker receives at minimum.
    pub base_per_worker: usize,
    /// Number of workers that receive one extra target.
    pub extra: usize,
    /// Rough upper bound on run duration, assuming all workers progress in
    /// parallel at the configured delay plus ~2s of per-invite overhead.
    #[serde(with = "duration_secs")]
    pub estimated: Duration,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        d.as_secs().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
