use crate::client::types::GroupRef;
use crate::distributor::DEFAULT_CHUNK_SIZE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unique identifier for one run.
///
/// Wrapper around a UUID string; hands external callers (the presentation
/// layer) something stable to cancel or query a run by.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RunId(pub String);

impl RunId {
    /// Generates a new random UUID v4-based RunId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tunables for one run. Everything except the destination group and the
/// inter-invite delay has a sensible default.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Destination group every target is invited into.
    pub group: GroupRef,
    /// Delay between successive invitations on one worker.
    pub delay: Duration,
    /// Targets per chunk; bounds how much in-flight work a cooldown orphans.
    pub chunk_size: usize,
    /// Minimum interval between non-forced progress publishes.
    pub publish_interval: Duration,
    /// How long the controller keeps waiting for orphans to drain after a
    /// cancellation before counting them as failed.
    pub drain_grace: Duration,
    /// Poll interval for the redistribution loop and the controller's drain
    /// phase. Keeps waiting loops from pegging a thread.
    pub poll_interval: Duration,
}

impl RunConfig {
    pub fn new(group: GroupRef, delay: Duration) -> Self {
        Self {
            group,
            delay,
            chunk_size: DEFAULT_CHUNK_SIZE,
            publish_interval: Duration::from_secs(3),
            drain_grace: Duration::from_secs(10),
            poll_interval: Duration::from_millis(500),
        }
    }
}
