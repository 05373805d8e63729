//! # gatepass-audit
//!
//! Append-only, SHA-256 hash-chained ledger of GATEPASS lifecycle
//! transitions.
//!
//! Every `TransitionRecord` the lifecycle commits is wrapped in an
//! `AuditEvent` that links to the previous entry by hash. Editing, removing
//! or reordering any entry breaks the chain and is caught by `verify_chain`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gatepass_audit::InMemoryAuditWriter;
//!
//! let audit = Arc::new(InMemoryAuditWriter::new("north-gate"));
//! let lifecycle = GuestLifecycle::new(store, audit.clone(), Arc::new(SystemClock));
//! // ... transitions ...
//! assert!(audit.verify_integrity());
//! let log = audit.export_log()?;
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_transition, verify_chain};
pub use event::{AuditEvent, AuditLog};
pub use memory::InMemoryAuditWriter;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use gatepass_contracts::{
        lifecycle::LifecycleStatus,
        transition::TransitionRecord,
        visit::{ApartmentId, GuestId},
    };
    use gatepass_core::traits::AuditWriter;

    use super::{AuditEvent, InMemoryAuditWriter};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn make_record(
        guest_id: GuestId,
        from: Option<LifecycleStatus>,
        to: LifecycleStatus,
        event: &str,
        version: u64,
    ) -> TransitionRecord {
        TransitionRecord {
            guest_id,
            apartment_id: ApartmentId::new("D2"),
            from,
            to,
            event: event.to_string(),
            actor: Some("resident-3".to_string()),
            reason: None,
            version,
            recorded_at: Utc::now(),
        }
    }

    /// create -> approve -> activate for one guest.
    fn write_visit(writer: &InMemoryAuditWriter, guest_id: GuestId) {
        use LifecycleStatus as S;
        writer
            .write(&make_record(guest_id, None, S::PendingApproval, "create", 1))
            .unwrap();
        writer
            .write(&make_record(guest_id, Some(S::PendingApproval), S::Approved, "approve", 2))
            .unwrap();
        writer
            .write(&make_record(guest_id, Some(S::Approved), S::Active, "activate", 3))
            .unwrap();
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_hash_chain_integrity() {
        let writer = InMemoryAuditWriter::new("gate-integrity");
        write_visit(&writer, GuestId::new());

        assert!(writer.verify_integrity(), "chain must be valid after sequential writes");
    }

    #[test]
    fn test_tamper_detection() {
        let writer = InMemoryAuditWriter::new("gate-tamper");
        write_visit(&writer, GuestId::new());

        {
            let mut state = writer.state.lock().unwrap();
            state.events[1].record.actor = Some("intruder".to_string());
        }

        assert!(!writer.verify_integrity(), "edited entry must break the chain");
    }

    #[test]
    fn test_removed_entry_is_detected() {
        let writer = InMemoryAuditWriter::new("gate-remove");
        write_visit(&writer, GuestId::new());

        let mut log = writer.export_log().unwrap();
        log.events.remove(1);

        assert!(!super::verify_chain(&log.events));
    }

    #[test]
    fn test_reordered_entries_are_detected() {
        let writer = InMemoryAuditWriter::new("gate-reorder");
        write_visit(&writer, GuestId::new());

        let mut log = writer.export_log().unwrap();
        log.events.swap(1, 2);

        assert!(!super::verify_chain(&log.events));
    }

    #[test]
    fn test_genesis_hash() {
        let writer = InMemoryAuditWriter::new("gate-genesis");
        write_visit(&writer, GuestId::new());

        let log = writer.export_log().unwrap();
        assert_eq!(log.events[0].prev_hash, AuditEvent::GENESIS_HASH);
        assert_eq!(log.events[0].sequence, 0);
    }

    #[test]
    fn test_export_log() {
        let writer = InMemoryAuditWriter::new("gate-export");
        write_visit(&writer, GuestId::new());

        let log = writer.export_log().unwrap();

        assert_eq!(log.ledger_id, "gate-export");
        assert_eq!(log.events.len(), 3);
        assert_eq!(log.terminal_hash, log.events.last().unwrap().this_hash);
        for (idx, event) in log.events.iter().enumerate() {
            assert_eq!(event.sequence, idx as u64);
        }
        assert!(super::verify_chain(&log.events));
    }

    #[test]
    fn test_same_record_hashes_differently_per_ledger() {
        let record = make_record(GuestId::new(), None, LifecycleStatus::Approved, "create", 1);

        let a = super::hash_transition("north-gate", 0, &record, AuditEvent::GENESIS_HASH).unwrap();
        let b = super::hash_transition("south-gate", 0, &record, AuditEvent::GENESIS_HASH).unwrap();

        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_history_filters_by_guest() {
        let writer = InMemoryAuditWriter::new("gate-history");
        let first = GuestId::new();
        let second = GuestId::new();
        write_visit(&writer, first);
        writer
            .write(&make_record(second, None, LifecycleStatus::Approved, "create", 1))
            .unwrap();

        let events: Vec<_> = writer
            .history(&first)
            .unwrap()
            .into_iter()
            .map(|r| r.event)
            .collect();

        assert_eq!(events, vec!["create", "approve", "activate"]);
        assert_eq!(writer.history(&second).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_ledger() {
        let writer = InMemoryAuditWriter::new("gate-empty");

        assert!(writer.verify_integrity());
        assert!(super::verify_chain(&[]));
        assert_eq!(writer.export_log().unwrap().terminal_hash, "");
    }
}
