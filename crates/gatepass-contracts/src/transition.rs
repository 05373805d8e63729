//! Audit records for committed lifecycle transitions.
//!
//! Every status change that reaches the store, including the initial
//! creation, produces exactly one `TransitionRecord`. Records are handed to
//! the audit writer and never modified afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    lifecycle::{LifecycleState, LifecycleStatus},
    visit::{ApartmentId, GuestId},
};

/// Event name recorded when a lifecycle state is first created.
pub const CREATE_EVENT: &str = "create";

/// An immutable record of one committed lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub guest_id: GuestId,
    pub apartment_id: ApartmentId,
    /// Status before the transition. `None` for creation.
    pub from: Option<LifecycleStatus>,
    pub to: LifecycleStatus,
    /// `create`, or the `LifecycleEvent::kind()` that caused the change.
    pub event: String,
    /// Approver or revoker identity, when a person acted.
    pub actor: Option<String>,
    pub reason: Option<String>,
    /// Store version the new state was written at.
    pub version: u64,
    /// When the transition was committed (UTC), as read from the
    /// lifecycle's clock.
    pub recorded_at: DateTime<Utc>,
}

impl TransitionRecord {
    /// Describe a committed state. `from` is the status before the write.
    pub fn committed(
        state: &LifecycleState,
        from: Option<LifecycleStatus>,
        event: &str,
        actor: Option<&str>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            guest_id: state.record.guest_id,
            apartment_id: state.record.apartment_id.clone(),
            from,
            to: state.status,
            event: event.to_string(),
            actor: actor.map(str::to_string),
            reason: state.reason.clone(),
            version: state.version,
            recorded_at,
        }
    }
}
