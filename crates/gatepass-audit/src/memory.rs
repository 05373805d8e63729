//! In-memory implementation of `AuditWriter`.
//!
//! Entries live in a `Vec` behind a `Mutex`. Appends from concurrent
//! lifecycle operations are serialized by that lock, so the chain order is
//! the order in which writes acquired it.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::debug;

use gatepass_contracts::{
    error::{GatepassError, GatepassResult},
    transition::TransitionRecord,
    visit::GuestId,
};
use gatepass_core::traits::AuditWriter;

use crate::{
    chain::{hash_transition, verify_chain},
    event::{AuditEvent, AuditLog},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct InMemoryState {
    pub(crate) events: Vec<AuditEvent>,

    /// `this_hash` of the last entry, or `GENESIS_HASH` while empty.
    pub(crate) last_hash: String,
}

// ── Public writer ─────────────────────────────────────────────────────────────

/// An append-only transition ledger backed by a SHA-256 hash chain.
pub struct InMemoryAuditWriter {
    ledger_id: String,
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryAuditWriter {
    /// An empty ledger. `ledger_id` names it in exports, usually the
    /// deployment name.
    pub fn new(ledger_id: impl Into<String>) -> Self {
        let state = InMemoryState {
            events: Vec::new(),
            last_hash: AuditEvent::GENESIS_HASH.to_string(),
        };
        Self {
            ledger_id: ledger_id.into(),
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// The name this ledger was created with.
    pub fn ledger_id(&self) -> &str {
        &self.ledger_id
    }

    /// Export every entry written so far.
    pub fn export_log(&self) -> GatepassResult<AuditLog> {
        let state = self.lock()?;
        let terminal_hash = state
            .events
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        Ok(AuditLog {
            ledger_id: self.ledger_id.clone(),
            events: state.events.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        })
    }

    /// The transition history of one guest, oldest first.
    pub fn history(&self, guest_id: &GuestId) -> GatepassResult<Vec<TransitionRecord>> {
        let state = self.lock()?;
        Ok(state
            .events
            .iter()
            .filter(|e| e.record.guest_id == *guest_id)
            .map(|e| e.record.clone())
            .collect())
    }

    /// Confirm the in-memory chain has not been altered. A poisoned lock
    /// counts as a failed check.
    pub fn verify_integrity(&self) -> bool {
        self.lock().map(|state| verify_chain(&state.events)).unwrap_or(false)
    }

    fn lock(&self) -> GatepassResult<MutexGuard<'_, InMemoryState>> {
        self.state.lock().map_err(|e| GatepassError::AuditWriteFailed {
            reason: format!("audit state lock poisoned: {e}"),
        })
    }
}

// ── AuditWriter impl ──────────────────────────────────────────────────────────

impl AuditWriter for InMemoryAuditWriter {
    fn write(&self, record: &TransitionRecord) -> GatepassResult<()> {
        let mut state = self.lock()?;

        let sequence = state.events.len() as u64;
        let prev_hash = state.last_hash.clone();
        let this_hash = hash_transition(&self.ledger_id, sequence, record, &prev_hash)?;

        debug!(
            ledger_id = %self.ledger_id,
            sequence,
            guest_id = %record.guest_id,
            event = %record.event,
            "transition appended to audit ledger"
        );

        state.events.push(AuditEvent {
            sequence,
            ledger_id: self.ledger_id.clone(),
            record: record.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.last_hash = this_hash;

        Ok(())
    }
}
