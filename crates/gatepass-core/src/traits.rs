//! Core trait definitions for the GATEPASS lifecycle.
//!
//! These traits are the only seams between the lifecycle logic and the
//! outside world:
//!
//! - `LifecycleStore`: where per-guest state lives (trusted, external)
//! - `AuditWriter`: where committed transitions are recorded (trusted sink)
//! - `Clock`: where audit timestamps come from
//!
//! The lifecycle service never assumes a storage technology; it only needs
//! read-modify-write with an optimistic version check per guest.

use chrono::{DateTime, Utc};

use gatepass_contracts::{
    error::{GatepassResult, StoreError},
    lifecycle::LifecycleState,
    transition::TransitionRecord,
    visit::GuestId,
};

/// Optimistic-concurrency key-value store for lifecycle state.
///
/// Implementations must provide at least sequential consistency per
/// `GuestId`: once `put` has returned, every later `get` for that guest
/// observes the write. Different guests need no mutual ordering.
pub trait LifecycleStore: Send + Sync {
    /// Load the current state for `guest_id`, or `None` if never created.
    fn get(&self, guest_id: &GuestId) -> Result<Option<LifecycleState>, StoreError>;

    /// Write `state` for `guest_id` if the stored version equals
    /// `expected_version`, and return the version it was written at.
    ///
    /// `expected_version = None` means create-only: the write succeeds only
    /// if no state exists yet. The store assigns versions itself (1 on
    /// create, previous + 1 afterwards) and ignores `state.version`.
    ///
    /// A version mismatch returns `StoreError::Conflict`; the caller should
    /// re-read and retry.
    fn put(
        &self,
        guest_id: &GuestId,
        state: LifecycleState,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError>;
}

/// The audit writer: the append-only record of lifecycle transitions.
///
/// Every committed transition, including creation, produces exactly one
/// `TransitionRecord`. Records written here are never modified or deleted.
pub trait AuditWriter: Send + Sync {
    /// Append one transition record.
    fn write(&self, record: &TransitionRecord) -> GatepassResult<()>;
}

/// Source of the UTC instant stamped on audit records.
///
/// Admission decisions never consult this clock; `evaluate` is always given
/// the gate's local time by its caller.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
