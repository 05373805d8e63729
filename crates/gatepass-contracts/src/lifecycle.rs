//! Lifecycle status, events, and the per-guest state record.
//!
//! The transition table itself lives in `gatepass-core`; this module only
//! defines the vocabulary it operates on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::visit::{ApprovalType, GuestId, VisitRecord};

/// Where a visit stands in its approval/expiry lifecycle.
///
/// ```text
/// pending_approval ──approve──▶ approved ──activate──▶ active
///        │                          │                     │
///        └──deny──▶ denied          ├──expire──▶ expired ◀┤
///                                   └──revoke──▶ revoked ◀┘
/// ```
///
/// `denied`, `expired` and `revoked` are terminal. Revocation is also
/// accepted while the visit is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    PendingApproval,
    Approved,
    Denied,
    Active,
    Expired,
    Revoked,
}

impl LifecycleStatus {
    /// The status a freshly issued visit starts in.
    pub fn initial_for(approval_type: ApprovalType) -> Self {
        if approval_type.requires_approval() {
            LifecycleStatus::PendingApproval
        } else {
            LifecycleStatus::Approved
        }
    }

    /// True once no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LifecycleStatus::Denied | LifecycleStatus::Expired | LifecycleStatus::Revoked
        )
    }

    /// Snake-case name, as written to audit records.
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleStatus::PendingApproval => "pending_approval",
            LifecycleStatus::Approved => "approved",
            LifecycleStatus::Denied => "denied",
            LifecycleStatus::Active => "active",
            LifecycleStatus::Expired => "expired",
            LifecycleStatus::Revoked => "revoked",
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that can happen to a visit.
///
/// Approver-driven events carry the opaque identity supplied by the
/// external auth layer. `Activate` and `Expire` are produced by time-window
/// evaluation and have no actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    Approve { approver: String },
    Deny { approver: String, reason: String },
    Revoke { by: String },
    Activate,
    Expire,
}

impl LifecycleEvent {
    /// Short name used in logs, errors and audit records.
    pub fn kind(&self) -> &'static str {
        match self {
            LifecycleEvent::Approve { .. } => "approve",
            LifecycleEvent::Deny { .. } => "deny",
            LifecycleEvent::Revoke { .. } => "revoke",
            LifecycleEvent::Activate => "activate",
            LifecycleEvent::Expire => "expire",
        }
    }

    /// The approver or revoker behind the event. `None` for time-driven
    /// events.
    pub fn actor(&self) -> Option<&str> {
        match self {
            LifecycleEvent::Approve { approver } | LifecycleEvent::Deny { approver, .. } => {
                Some(approver)
            }
            LifecycleEvent::Revoke { by } => Some(by),
            LifecycleEvent::Activate | LifecycleEvent::Expire => None,
        }
    }

    /// The resident's reason, carried by `Deny` only.
    pub fn reason(&self) -> Option<&str> {
        match self {
            LifecycleEvent::Deny { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// The mutable access-control record for one visit.
///
/// Created together with the `VisitRecord` and never deleted: terminal
/// states are kept so the history stays auditable. `version` is assigned by
/// the lifecycle store and bumped on every successful write; it is `0` for a
/// state that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleState {
    /// The visit this state governs. The validity window is read from here.
    pub record: VisitRecord,
    pub status: LifecycleStatus,
    pub version: u64,
    /// Identity of the approver or revoker that last acted, if any.
    #[serde(default)]
    pub last_actor: Option<String>,
    /// Denial reason, when denied.
    #[serde(default)]
    pub reason: Option<String>,
}

impl LifecycleState {
    /// The unpersisted initial state for `record`.
    pub fn initial(record: VisitRecord) -> Self {
        let status = LifecycleStatus::initial_for(record.approval_type);
        Self {
            record,
            status,
            version: 0,
            last_actor: None,
            reason: None,
        }
    }

    /// Shorthand for `self.record.guest_id`.
    pub fn guest_id(&self) -> &GuestId {
        &self.record.guest_id
    }
}
