//! Hashing and chain verification for the transition ledger.
//!
//! Hash input layout (bytes, in order):
//!   1. ledger_id as UTF-8 bytes
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. compact JSON of the transition record

use sha2::{Digest, Sha256};

use gatepass_contracts::{
    error::{GatepassError, GatepassResult},
    transition::TransitionRecord,
};

use crate::event::AuditEvent;

/// Compute the SHA-256 hash of one ledger entry as lowercase hex.
///
/// Commits to the ledger the entry belongs to, its position, the previous
/// entry's hash, and every field of the record.
pub fn hash_transition(
    ledger_id: &str,
    sequence: u64,
    record: &TransitionRecord,
    prev_hash: &str,
) -> GatepassResult<String> {
    let record_json =
        serde_json::to_vec(record).map_err(|e| GatepassError::AuditWriteFailed {
            reason: format!("transition record not serializable: {e}"),
        })?;

    let mut hasher = Sha256::new();
    hasher.update(ledger_id.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&record_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Check a chain of events.
///
/// Valid when every event links to its predecessor (or to `GENESIS_HASH`
/// for the first), sequences run 0, 1, 2, ... without gaps, and every
/// stored hash matches the hash recomputed from the event's fields. An
/// empty chain is valid.
pub fn verify_chain(events: &[AuditEvent]) -> bool {
    let mut expected_prev: &str = AuditEvent::GENESIS_HASH;

    for (position, event) in events.iter().enumerate() {
        if event.sequence != position as u64 || event.prev_hash != expected_prev {
            return false;
        }

        match hash_transition(&event.ledger_id, event.sequence, &event.record, &event.prev_hash) {
            Ok(recomputed) if recomputed == event.this_hash => {}
            _ => return false,
        }

        expected_prev = event.this_hash.as_str();
    }

    true
}
