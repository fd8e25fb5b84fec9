//! Remote Operations Interface
//!
//! The narrow seam between the invitation engine and the remote service. The
//! engine is implementable purely against these two traits; the concrete wire
//! protocol, authentication handshake and encryption live behind them and are
//! of no concern here.
//!
//! ## Contract
//! - **`Connector`**: turns a `Credential` into a connected `GroupClient`.
//!   A connection failure excludes that account from the run.
//! - **`GroupClient`**: one account's live connection. Owned exclusively by
//!   the worker loop that drives it; never shared between tasks.
//!
//! Invitation outcomes are in-band enum variants (`InviteOutcome`), not
//! errors: a rate limit is a scheduling event the engine reacts to, and a
//! per-target rejection is a counter increment, so neither travels as `Err`.

pub mod types;

#[cfg(test)]
mod tests;

use anyhow::Result;
use async_trait::async_trait;

use types::{Credential, GroupRef, InviteOutcome, JoinOutcome, Target};

/// A live, authorized connection for one account.
#[async_trait]
pub trait GroupClient: Send + 'static {
    /// Attempts to join the destination group. Implementations must map the
    /// remote "already a participant" signal to `JoinOutcome::AlreadyMember`
    /// rather than an error.
    async fn join_group(&mut self, group: &GroupRef) -> Result<JoinOutcome>;

    /// Performs one invitation. All failure modes are expressed through the
    /// returned `InviteOutcome`; this call itself never fails.
    async fn invite(&mut self, group: &GroupRef, target: &Target) -> InviteOutcome;

    /// Releases the connection. Best-effort: implementations log and swallow
    /// teardown failures.
    async fn disconnect(&mut self);
}

/// Factory producing connected clients from credentials.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Client: GroupClient;

    /// Establishes a connection for the given credential.
    async fn connect(&self, credential: &Credential) -> Result<Self::Client>;
}
