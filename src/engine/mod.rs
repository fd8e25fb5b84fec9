//! Invitation Engine
//!
//! The task-distribution core: runs a pool of credentialed workers over a
//! shared target list and keeps throughput high while workers drop in and
//! out of availability.
//!
//! ## Architecture Overview
//! 1. **Distribution**: the target list is split into per-worker shares and
//!    small chunks (see `crate::distributor`).
//! 2. **Execution**: one concurrent task per worker walks its chunks with an
//!    inter-invite delay (`worker`).
//! 3. **Redistribution**: a rate-limited or failed worker orphans its
//!    unprocessed remainder; a single matching loop hands orphans to idle
//!    peers in FIFO order (`orphans`, `redistributor`).
//! 4. **Lifecycle**: the controller spawns everything, drains the pool,
//!    tears connections down and emits the final report (`controller`).
//!
//! ## Submodules
//! - **`controller`**: run lifecycle from distribution to final report.
//! - **`worker`**: the per-worker execution loop state machine.
//! - **`redistributor`**: the orphan-to-helper matching loop.
//! - **`orphans`**: the shared FIFO pool of orphaned work.
//! - **`registry`**: process-scoped run handles and cancellation.
//! - **`types`**: run configuration and identifiers.

pub mod controller;
pub mod orphans;
pub mod redistributor;
pub mod registry;
pub mod types;
pub mod worker;


pub use controller::RunController;
pub use registry::RunRegistry;
pub use types::{RunConfig, RunId};
