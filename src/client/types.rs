use serde::{Deserialize, Serialize};

/// Identity of one worker (credentialed account) within a run.
///
/// Wrapper around the credential's identity label (e.g. a phone number).
/// Progress records, orphaned work and report lines are all keyed by this id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WorkerId(pub String);

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reusable credential for one account.
///
/// The `label` identifies the account in reports and progress views; the
/// `session` token is the opaque material the connector needs to establish a
/// connection. How the token was obtained (verification-code flow, two-factor
/// exchange) is outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Identity label, typically the account's phone number.
    pub label: String,
    /// Opaque session token consumed by the `Connector`.
    pub session: String,
}

impl Credential {
    pub fn worker_id(&self) -> WorkerId {
        WorkerId(self.label.clone())
    }
}

/// Reference to the destination group (link or username).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupRef(pub String);

impl std::fmt::Display for GroupRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One normalized target identifier (a phone number) to be invited exactly
/// once within a run. The caller guarantees the input list is deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Target(pub String);

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a group-join attempt that did not error.
///
/// "Already a member" is a success, not an error: the account can invite
/// either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyMember,
}

/// Result of one invitation attempt.
///
/// Every way a single invite can end is a variant here, including the rate
/// limit. Callers switch on the variant explicitly; nothing about a single
/// invite is surfaced as an `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteOutcome {
    /// The target was invited into the group.
    Invited,
    /// No account exists for this identifier. Terminal for the target.
    NotFound,
    /// The remote service imposed a cooldown on this account, advertising a
    /// wait duration in seconds. The account must stop inviting immediately.
    RateLimited { wait_secs: u64 },
    /// The remote service rejected this specific invitation (privacy
    /// restriction, mutual-contact requirement, ...). Terminal for the target.
    Failed { reason: String },
}
