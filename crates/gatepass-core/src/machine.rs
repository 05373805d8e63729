//! The pure lifecycle transition table and time-window assessment.
//!
//! Nothing here touches storage. `apply` is a total function over
//! (status, event); `assess` decides admission for a state at a point in
//! time and says which event, if any, must be committed for that decision
//! to hold.

use chrono::NaiveDateTime;

use gatepass_contracts::{
    decision::{AdmissionDecision, DenyReason},
    error::TransitionError,
    lifecycle::{LifecycleEvent, LifecycleState, LifecycleStatus},
    visit::WindowPosition,
};

/// Compute the status `event` moves `status` to.
///
/// Every (status, event) pair is listed; there is no catch-all arm.
pub fn apply(
    status: LifecycleStatus,
    event: &LifecycleEvent,
) -> Result<LifecycleStatus, TransitionError> {
    use LifecycleEvent as E;
    use LifecycleStatus as S;

    match (status, event) {
        (S::PendingApproval, E::Approve { .. }) => Ok(S::Approved),
        (S::PendingApproval, E::Deny { .. }) => Ok(S::Denied),

        (S::PendingApproval | S::Approved | S::Active, E::Revoke { .. }) => Ok(S::Revoked),

        // Re-activation of an active visit is a no-op, not an error.
        (S::Approved | S::Active, E::Activate) => Ok(S::Active),
        (S::Approved | S::Active, E::Expire) => Ok(S::Expired),

        (
            S::Approved | S::Denied | S::Active | S::Expired | S::Revoked,
            E::Approve { .. } | E::Deny { .. },
        )
        | (S::Denied | S::Expired | S::Revoked, E::Revoke { .. })
        | (S::PendingApproval | S::Denied | S::Expired | S::Revoked, E::Activate | E::Expire) => {
            Err(TransitionError::InvalidTransition {
                from: status,
                event: event.kind(),
            })
        }
    }
}

/// The outcome of assessing a state at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub decision: AdmissionDecision,
    /// Event to commit before the decision may be acted on, if any.
    pub event: Option<LifecycleEvent>,
}

impl Assessment {
    fn settled(decision: AdmissionDecision) -> Self {
        Self { decision, event: None }
    }
}

/// Decide admission for `state` at `now`.
///
/// - pending, denied, expired, revoked: deny with that status's reason.
/// - approved/active before the window opens: deny `not_yet_valid`, no event.
/// - approved/active inside the window: admit; approved visits must first
///   commit `Activate`.
/// - approved/active after the window closes: deny `expired` and commit
///   `Expire`.
pub fn assess(state: &LifecycleState, now: NaiveDateTime) -> Assessment {
    let deny = |reason| Assessment::settled(AdmissionDecision::deny(reason));

    match state.status {
        LifecycleStatus::PendingApproval => deny(DenyReason::PendingApproval),
        LifecycleStatus::Denied => deny(DenyReason::Denied),
        LifecycleStatus::Expired => deny(DenyReason::Expired),
        LifecycleStatus::Revoked => deny(DenyReason::Revoked),
        LifecycleStatus::Approved | LifecycleStatus::Active => {
            match state.record.window_position(now) {
                WindowPosition::NotYetValid => deny(DenyReason::NotYetValid),
                WindowPosition::Within => Assessment {
                    decision: AdmissionDecision::Admit,
                    event: (state.status == LifecycleStatus::Approved)
                        .then_some(LifecycleEvent::Activate),
                },
                WindowPosition::Elapsed => Assessment {
                    decision: AdmissionDecision::deny(DenyReason::Expired),
                    event: Some(LifecycleEvent::Expire),
                },
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
