//! Error taxonomy for the GATEPASS credential pipeline.
//!
//! Component errors (`DecodeError`, `CipherError`, `TransitionError`,
//! `StoreError`) stay typed so callers can match on them. None of them is
//! fatal: the verification service turns every one into a coarse deny
//! reason, and the lifecycle API returns them for the caller to retry or
//! report.

use thiserror::Error;

use crate::{lifecycle::LifecycleStatus, visit::GuestId};

/// The canonical record bytes could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Truncated, garbled, or trailing input, or a field outside its domain.
    #[error("malformed credential record: {reason}")]
    Malformed { reason: String },

    /// The leading version byte names a format this build cannot read.
    #[error("unsupported credential format version {version}")]
    UnknownVersion { version: u8 },
}

/// Sealing or opening a token failed.
///
/// `InvalidToken` deliberately carries no detail: a wrong key, a flipped
/// bit and broken base64 are indistinguishable to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    #[error("invalid token")]
    InvalidToken,

    #[error("credential could not be sealed")]
    SealFailed,
}

/// A lifecycle event is not legal from the current status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("illegal transition: cannot {event} a visit that is {from}")]
    InvalidTransition {
        from: LifecycleStatus,
        event: &'static str,
    },
}

/// The lifecycle store refused a read or write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no lifecycle state for guest {guest_id}")]
    NotFound { guest_id: GuestId },

    /// Optimistic concurrency check failed. Re-read and retry.
    #[error("version conflict for guest {guest_id}: expected {expected:?}, found {actual:?}")]
    Conflict {
        guest_id: GuestId,
        expected: Option<u64>,
        actual: Option<u64>,
    },

    /// The storage backend itself failed.
    #[error("lifecycle store backend failure: {reason}")]
    Backend { reason: String },
}

/// The unified error type for the GATEPASS crates.
#[derive(Debug, Error)]
pub enum GatepassError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// An issuance request violated a record invariant.
    #[error("invalid visit request: {reason}")]
    InvalidRequest { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The audit writer could not persist a transition record.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },
}

impl GatepassError {
    /// True for errors the caller may resolve by re-reading state and retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatepassError::Transition(_) | GatepassError::Store(StoreError::Conflict { .. })
        )
    }
}

/// Convenience alias used throughout the GATEPASS crates.
pub type GatepassResult<T> = Result<T, GatepassError>;
