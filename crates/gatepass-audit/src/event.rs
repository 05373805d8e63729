//! Ledger entry and export types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatepass_contracts::transition::TransitionRecord;

/// One transition record, positioned and hash-linked within a ledger.
///
/// Changing any field, including any field of `record`, invalidates
/// `this_hash` and every later `prev_hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Position in the ledger, starting at 0.
    pub sequence: u64,

    /// The ledger this entry belongs to, usually one per gate deployment.
    pub ledger_id: String,

    pub record: TransitionRecord,

    /// `this_hash` of the previous entry, or `GENESIS_HASH` for the first.
    pub prev_hash: String,

    /// SHA-256 (hex) over (ledger_id, sequence, prev_hash, record JSON).
    pub this_hash: String,
}

impl AuditEvent {
    /// The `prev_hash` of the first entry in every ledger: 64 hex zeros.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A point-in-time export of a whole ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub ledger_id: String,

    /// All entries in sequence order.
    pub events: Vec<AuditEvent>,

    pub exported_at: DateTime<Utc>,

    /// `this_hash` of the last entry; empty when the ledger is empty.
    pub terminal_hash: String,
}
