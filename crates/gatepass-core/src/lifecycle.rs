//! The guest lifecycle service: transitions committed through the store.
//!
//! `GuestLifecycle` wraps the pure transition table in `machine` with
//! read-modify-write against a `LifecycleStore`. Every write carries the
//! version it was computed from, so two racing transitions on the same guest
//! can never both commit from the same starting state: the loser gets a
//! conflict, re-reads, and re-applies its event to the fresh state (which
//! may now reject it).
//!
//! Every committed transition is handed to the `AuditWriter`, stamped with
//! the time read from the injected `Clock`.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, error, info, warn};

use gatepass_contracts::{
    decision::{AdmissionDecision, DenyReason},
    error::{GatepassError, GatepassResult, StoreError},
    lifecycle::{LifecycleEvent, LifecycleState, LifecycleStatus},
    transition::{TransitionRecord, CREATE_EVENT},
    visit::{GuestId, VisitRecord},
};

use crate::{
    machine,
    traits::{AuditWriter, Clock, LifecycleStore},
};

/// How many times a transition is re-applied after a version conflict
/// before the conflict is surfaced to the caller.
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 8;

/// Lifecycle operations for guest visits.
///
/// Holds no per-guest state of its own; cheap to share across gate threads.
pub struct GuestLifecycle {
    store: Arc<dyn LifecycleStore>,
    audit: Arc<dyn AuditWriter>,
    clock: Arc<dyn Clock>,
    max_conflict_retries: u32,
}

impl GuestLifecycle {
    /// Wire a lifecycle over its three ports, with the default retry budget.
    pub fn new(
        store: Arc<dyn LifecycleStore>,
        audit: Arc<dyn AuditWriter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            audit,
            clock,
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }

    /// Override how many version conflicts a single operation absorbs
    /// before giving up.
    pub fn with_max_conflict_retries(mut self, retries: u32) -> Self {
        self.max_conflict_retries = retries;
        self
    }

    /// Create the initial lifecycle state for a newly issued visit.
    ///
    /// `needs_approval` visits start in `pending_approval`; every other
    /// approval type starts `approved`. Fails with `StoreError::Conflict` if
    /// state already exists for the guest.
    pub fn create(&self, record: VisitRecord) -> GatepassResult<LifecycleState> {
        record.validate()?;

        let mut state = LifecycleState::initial(record);
        let guest_id = *state.guest_id();
        state.version = self.store.put(&guest_id, state.clone(), None)?;

        info!(
            guest_id = %guest_id,
            apartment_id = %state.record.apartment_id,
            status = %state.status,
            "visit lifecycle created"
        );
        self.record_transition(&state, None, CREATE_EVENT, None);

        Ok(state)
    }

    /// Load the current state, failing with `StoreError::NotFound` if absent.
    pub fn get(&self, guest_id: &GuestId) -> GatepassResult<LifecycleState> {
        self.store
            .get(guest_id)?
            .ok_or(GatepassError::Store(StoreError::NotFound { guest_id: *guest_id }))
    }

    /// Approve a pending visit. Legal only from `pending_approval`.
    pub fn approve(&self, guest_id: &GuestId, approver: &str) -> GatepassResult<LifecycleState> {
        self.transition(
            guest_id,
            LifecycleEvent::Approve {
                approver: approver.to_string(),
            },
        )
    }

    /// Deny a pending visit. Legal only from `pending_approval`.
    pub fn deny(
        &self,
        guest_id: &GuestId,
        approver: &str,
        reason: &str,
    ) -> GatepassResult<LifecycleState> {
        self.transition(
            guest_id,
            LifecycleEvent::Deny {
                approver: approver.to_string(),
                reason: reason.to_string(),
            },
        )
    }

    /// Revoke a visit from any non-terminal state.
    ///
    /// Once this returns, every `evaluate` that starts afterwards denies with
    /// `revoked`.
    pub fn revoke(&self, guest_id: &GuestId, by: &str) -> GatepassResult<LifecycleState> {
        self.transition(guest_id, LifecycleEvent::Revoke { by: by.to_string() })
    }

    /// Decide admission for `guest_id` at `now`, committing any activation
    /// or expiry the decision depends on.
    ///
    /// Never fails: a missing guest is `Deny(unknown_guest)`, and a store
    /// that errors or keeps conflicting is `Deny(unavailable)`.
    pub fn evaluate(&self, guest_id: &GuestId, now: NaiveDateTime) -> AdmissionDecision {
        self.evaluate_inner(guest_id, None, now)
    }

    /// Like `evaluate`, but also requires the stored visit to be exactly
    /// `presented`, the record decoded from a scanned credential.
    ///
    /// A mismatch means the credential does not belong to the visit that
    /// owns this guest ID and is treated as `Deny(invalid_token)`.
    pub fn evaluate_presented(
        &self,
        presented: &VisitRecord,
        now: NaiveDateTime,
    ) -> AdmissionDecision {
        self.evaluate_inner(&presented.guest_id, Some(presented), now)
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn evaluate_inner(
        &self,
        guest_id: &GuestId,
        presented: Option<&VisitRecord>,
        now: NaiveDateTime,
    ) -> AdmissionDecision {
        let mut conflicts = 0;

        loop {
            let current = match self.store.get(guest_id) {
                Ok(Some(state)) => state,
                Ok(None) | Err(StoreError::NotFound { .. }) => {
                    debug!(guest_id = %guest_id, "no lifecycle state for scanned guest");
                    return AdmissionDecision::deny(DenyReason::UnknownGuest);
                }
                Err(e) => {
                    warn!(guest_id = %guest_id, error = %e, "lifecycle store unavailable during evaluation");
                    return AdmissionDecision::deny(DenyReason::Unavailable);
                }
            };

            if presented.is_some_and(|record| *record != current.record) {
                warn!(guest_id = %guest_id, "presented credential does not match stored visit");
                return AdmissionDecision::deny(DenyReason::InvalidToken);
            }

            let assessment = machine::assess(&current, now);
            let Some(event) = assessment.event else {
                debug!(
                    guest_id = %guest_id,
                    status = %current.status,
                    decision = %assessment.decision,
                    "evaluation settled without a transition"
                );
                return assessment.decision;
            };

            let next = match self.next_state(&current, &event) {
                Ok(next) => next,
                Err(e) => {
                    error!(guest_id = %guest_id, error = %e, "assessment produced an illegal transition");
                    return AdmissionDecision::deny(DenyReason::Unavailable);
                }
            };

            match self.commit(&current, next, &event) {
                Ok(_) => return assessment.decision,
                Err(StoreError::Conflict { .. }) if conflicts < self.max_conflict_retries => {
                    conflicts += 1;
                    debug!(guest_id = %guest_id, attempt = conflicts, "evaluation lost a version race, re-reading");
                }
                Err(e) => {
                    warn!(guest_id = %guest_id, error = %e, "could not commit evaluation transition");
                    return AdmissionDecision::deny(DenyReason::Unavailable);
                }
            }
        }
    }

    /// Apply an approver-driven event with optimistic retries.
    fn transition(
        &self,
        guest_id: &GuestId,
        event: LifecycleEvent,
    ) -> GatepassResult<LifecycleState> {
        let mut conflicts = 0;

        loop {
            let current = self.get(guest_id)?;
            let next = self.next_state(&current, &event).map_err(|e| {
                warn!(
                    guest_id = %guest_id,
                    status = %current.status,
                    event = event.kind(),
                    "rejected lifecycle transition"
                );
                e
            })?;

            match self.commit(&current, next, &event) {
                Ok(committed) => return Ok(committed),
                Err(StoreError::Conflict { .. }) if conflicts < self.max_conflict_retries => {
                    conflicts += 1;
                    debug!(
                        guest_id = %guest_id,
                        event = event.kind(),
                        attempt = conflicts,
                        "transition lost a version race, re-reading"
                    );
                }
                Err(e) => {
                    if matches!(e, StoreError::Conflict { .. }) {
                        warn!(
                            guest_id = %guest_id,
                            event = event.kind(),
                            retries = conflicts,
                            "giving up after repeated version conflicts"
                        );
                    }
                    return Err(e.into());
                }
            }
        }
    }

    fn next_state(
        &self,
        current: &LifecycleState,
        event: &LifecycleEvent,
    ) -> GatepassResult<LifecycleState> {
        let status = machine::apply(current.status, event)?;
        let mut next = current.clone();
        next.status = status;
        if let Some(actor) = event.actor() {
            next.last_actor = Some(actor.to_string());
        }
        if let Some(reason) = event.reason() {
            next.reason = Some(reason.to_string());
        }
        Ok(next)
    }

    /// Write `next` if the store still holds `current`'s version.
    fn commit(
        &self,
        current: &LifecycleState,
        mut next: LifecycleState,
        event: &LifecycleEvent,
    ) -> Result<LifecycleState, StoreError> {
        next.version = self
            .store
            .put(current.guest_id(), next.clone(), Some(current.version))?;

        info!(
            guest_id = %current.guest_id(),
            from = %current.status,
            to = %next.status,
            event = event.kind(),
            version = next.version,
            "lifecycle transition committed"
        );
        self.record_transition(&next, Some(current.status), event.kind(), event.actor());

        Ok(next)
    }

    /// Audit a committed transition. A failed audit write is logged; it
    /// cannot undo a transition that is already in the store.
    fn record_transition(
        &self,
        state: &LifecycleState,
        from: Option<LifecycleStatus>,
        event: &str,
        actor: Option<&str>,
    ) {
        let record = TransitionRecord::committed(state, from, event, actor, self.clock.now());
        if let Err(e) = self.audit.write(&record) {
            error!(
                guest_id = %state.guest_id(),
                event = event,
                error = %e,
                "audit write failed for committed transition"
            );
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
