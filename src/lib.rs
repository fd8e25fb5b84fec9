//! Flood-Adaptive Mass Invitation Library
//!
//! Distributes a large batch of group invitations across a pool of
//! independently credentialed accounts, each subject to unpredictable remote
//! rate limits ("cooldowns"). The hard part is not one invitation; it is
//! keeping total throughput high and work loss at zero while accounts drop
//! in and out of availability.
//!
//! ## Architecture Modules
//! The crate is composed of four loosely coupled subsystems:
//!
//! - **`client`**: the narrow seam to the remote service. Two async traits
//!   (`Connector`, `GroupClient`) plus discriminated outcome types; the real
//!   wire protocol lives entirely behind them.
//! - **`distributor`**: deterministic splitting of the target list into
//!   per-worker shares and small interruptible chunks.
//! - **`engine`**: the concurrency core. One execution loop per worker, a
//!   FIFO pool of orphaned work, a redistribution loop matching orphans to
//!   idle helpers, and the run controller that owns the whole lifecycle.
//! - **`progress`**: per-worker counters and statuses under one shared lock,
//!   rate-limited rendering, and the structured final report.

pub mod client;
pub mod distributor;
pub mod engine;
pub mod progress;
