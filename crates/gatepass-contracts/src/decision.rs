//! Admission decisions returned to the gate.
//!
//! Deny reasons are deliberately coarse. A scanner learns that a token is
//! invalid, never whether the key, the tag or the encoding was at fault.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a guest was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The token failed to open under the supplied key.
    InvalidToken,
    /// The token opened but did not hold a well-formed visit record.
    MalformedRecord,
    /// No lifecycle state exists for the decoded guest.
    UnknownGuest,
    /// The visit still waits for an approver.
    PendingApproval,
    /// An approver rejected the visit.
    Denied,
    /// The validity window has not opened yet.
    NotYetValid,
    /// The validity window has closed.
    Expired,
    /// Access was revoked.
    Revoked,
    /// The caller gave up waiting. Never produced by the core itself.
    Timeout,
    /// The lifecycle store could not be reached or kept conflicting.
    Unavailable,
}

impl DenyReason {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            DenyReason::InvalidToken => "invalid_token",
            DenyReason::MalformedRecord => "malformed_record",
            DenyReason::UnknownGuest => "unknown_guest",
            DenyReason::PendingApproval => "pending_approval",
            DenyReason::Denied => "denied",
            DenyReason::NotYetValid => "not_yet_valid",
            DenyReason::Expired => "expired",
            DenyReason::Revoked => "revoked",
            DenyReason::Timeout => "timeout",
            DenyReason::Unavailable => "unavailable",
        }
    }

    /// Message suitable for showing to a guard.
    pub fn describe(self) -> &'static str {
        match self {
            DenyReason::InvalidToken => "This pass could not be read. Ask the guest for a new one.",
            DenyReason::MalformedRecord => "This pass is damaged. Ask the guest for a new one.",
            DenyReason::UnknownGuest => "This pass is not registered with the community.",
            DenyReason::PendingApproval => "The resident has not approved this visit yet.",
            DenyReason::Denied => "The resident declined this visit.",
            DenyReason::NotYetValid => "This pass is not valid yet.",
            DenyReason::Expired => "This pass has expired.",
            DenyReason::Revoked => "This pass was revoked by the resident.",
            DenyReason::Timeout => "Verification timed out. Try scanning again.",
            DenyReason::Unavailable => "Verification is unavailable. Try scanning again.",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The gate's verdict for one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AdmissionDecision {
    Admit,
    Deny { reason: DenyReason },
}

impl AdmissionDecision {
    /// Shorthand for `AdmissionDecision::Deny { reason }`.
    pub fn deny(reason: DenyReason) -> Self {
        AdmissionDecision::Deny { reason }
    }

    /// True only for `Admit`.
    pub fn is_admit(&self) -> bool {
        matches!(self, AdmissionDecision::Admit)
    }

    /// The deny reason, or `None` on admit.
    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            AdmissionDecision::Admit => None,
            AdmissionDecision::Deny { reason } => Some(*reason),
        }
    }

    /// Human-readable summary for the guard's screen.
    pub fn message(&self) -> &'static str {
        match self {
            AdmissionDecision::Admit => "Pass accepted. The guest may enter.",
            AdmissionDecision::Deny { reason } => reason.describe(),
        }
    }
}

impl fmt::Display for AdmissionDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionDecision::Admit => f.write_str("admit"),
            AdmissionDecision::Deny { reason } => write!(f, "deny({})", reason),
        }
    }
}
