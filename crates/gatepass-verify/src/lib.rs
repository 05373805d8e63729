//! # gatepass-verify
//!
//! The two ends of a GATEPASS credential's life outside the lifecycle:
//!
//! - [`CredentialIssuer`] turns a resident's request into a stored visit and
//!   a sealed, URL-safe token.
//! - [`GateVerifier`] turns a scanned token back into an admission decision.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use gatepass_verify::{CredentialIssuer, GateVerifier};
//!
//! let issuer = CredentialIssuer::new(lifecycle.clone());
//! let (record, token) = issuer.issue(request, &key, Utc::now())?;
//!
//! let verifier = GateVerifier::new(lifecycle);
//! let decision = verifier.verify(&key, &token, Local::now().naive_local());
//!
//! // A gate serving apartments with their own keys:
//! let decision = verifier.verify_with_keyring(&keyring, &token, Local::now().naive_local());
//! ```

pub mod engine;
pub mod issue;

pub use engine::GateVerifier;
pub use issue::CredentialIssuer;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

    use gatepass_audit::InMemoryAuditWriter;
    use gatepass_cipher::{seal, CredentialKey, KEY_LEN};
    use gatepass_codec::encode;
    use gatepass_config::Keyring;
    use gatepass_contracts::{
        decision::{AdmissionDecision, DenyReason},
        error::{GatepassError, StoreError},
        lifecycle::LifecycleStatus,
        token::Token,
        visit::{ApartmentId, ApprovalType, GuestType, IssueRequest, ValidityBound, VisitRecord},
    };
    use gatepass_core::GuestLifecycle;
    use gatepass_store::{InMemoryLifecycleStore, SystemClock};

    use crate::{CredentialIssuer, GateVerifier};

    // ── Helpers ───────────────────────────────────────────────────────────────

    struct Gate {
        lifecycle: Arc<GuestLifecycle>,
        audit: Arc<InMemoryAuditWriter>,
        issuer: CredentialIssuer,
        verifier: GateVerifier,
        key: CredentialKey,
    }

    fn gate() -> Gate {
        let audit = Arc::new(InMemoryAuditWriter::new("test-gate"));
        let lifecycle = Arc::new(GuestLifecycle::new(
            Arc::new(InMemoryLifecycleStore::new()),
            audit.clone(),
            Arc::new(SystemClock),
        ));
        Gate {
            issuer: CredentialIssuer::new(lifecycle.clone()),
            verifier: GateVerifier::new(lifecycle.clone()),
            lifecycle,
            audit,
            key: CredentialKey::from_bytes(&[0x42; KEY_LEN]).unwrap(),
        }
    }

    /// Deployment key 0x42 with B2 on its own key 0x52.
    fn keyring() -> (Keyring, CredentialKey) {
        let b2_key = CredentialKey::from_bytes(&[0x52; KEY_LEN]).unwrap();
        let keyring = Keyring::single(CredentialKey::from_bytes(&[0x42; KEY_LEN]).unwrap())
            .with_override(ApartmentId::new("B2"), b2_key.clone());
        (keyring, b2_key)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn at(d: u32, h: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, 0, 0).unwrap()
    }

    fn issued() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 7, 30, 0).unwrap()
    }

    fn one_time(apartment: &str, approval_type: ApprovalType, on: u32) -> IssueRequest {
        IssueRequest {
            apartment_id: ApartmentId::new(apartment),
            guest_type: GuestType::OneTime,
            approval_type,
            valid_from: ValidityBound::on(day(on)),
            valid_to: None,
        }
    }

    fn frequent(from: u32, to: u32) -> IssueRequest {
        IssueRequest {
            apartment_id: ApartmentId::new("B7"),
            guest_type: GuestType::Frequent,
            approval_type: ApprovalType::NeedsApproval,
            valid_from: ValidityBound::on(day(from)),
            valid_to: Some(ValidityBound::on(day(to))),
        }
    }

    // ── End to end ────────────────────────────────────────────────────────────

    /// Preapproved one-time pass for A1: admitted today (twice), expired
    /// tomorrow.
    #[test]
    fn test_preapproved_one_time_visit_end_to_end() {
        let g = gate();
        let (record, token) = g
            .issuer
            .issue(one_time("A1", ApprovalType::Preapproved, 3), &g.key, issued())
            .unwrap();

        assert_eq!(g.verifier.verify(&g.key, &token, at(3, 10)), AdmissionDecision::Admit);
        assert_eq!(g.verifier.verify(&g.key, &token, at(3, 18)), AdmissionDecision::Admit);
        assert_eq!(
            g.verifier.verify(&g.key, &token, at(4, 10)),
            AdmissionDecision::deny(DenyReason::Expired)
        );

        let events: Vec<_> = g
            .audit
            .history(&record.guest_id)
            .unwrap()
            .into_iter()
            .map(|r| r.event)
            .collect();
        assert_eq!(events, vec!["create", "activate", "expire"]);
        assert!(g.audit.verify_integrity());
    }

    #[test]
    fn test_frequent_visit_waits_for_approval() {
        let g = gate();
        let (record, token) = g.issuer.issue(frequent(2, 9), &g.key, issued()).unwrap();

        assert_eq!(
            g.verifier.verify(&g.key, &token, at(3, 10)),
            AdmissionDecision::deny(DenyReason::PendingApproval)
        );

        g.lifecycle.approve(&record.guest_id, "resident-b7").unwrap();

        for d in 2..=9 {
            assert_eq!(g.verifier.verify(&g.key, &token, at(d, 9)), AdmissionDecision::Admit, "day {d}");
        }
    }

    #[test]
    fn test_denied_request_never_admits() {
        let g = gate();
        let (record, token) = g.issuer.issue(frequent(2, 9), &g.key, issued()).unwrap();

        g.lifecycle.deny(&record.guest_id, "resident-b7", "do not know them").unwrap();

        assert_eq!(
            g.verifier.verify(&g.key, &token, at(3, 10)),
            AdmissionDecision::deny(DenyReason::Denied)
        );
    }

    #[test]
    fn test_revoked_pass_is_denied_inside_its_window() {
        let g = gate();
        let (record, token) = g
            .issuer
            .issue(one_time("A1", ApprovalType::Private, 3), &g.key, issued())
            .unwrap();
        assert_eq!(g.verifier.verify(&g.key, &token, at(3, 10)), AdmissionDecision::Admit);

        g.lifecycle.revoke(&record.guest_id, "resident-a1").unwrap();

        let decision = g.verifier.verify(&g.key, &token, at(3, 11));
        assert_eq!(decision, AdmissionDecision::deny(DenyReason::Revoked));
        assert!(decision.message().contains("revoked"));
    }

    // ── Token failures ────────────────────────────────────────────────────────

    #[test]
    fn test_tampered_token_is_invalid() {
        let g = gate();
        let (_, token) = g
            .issuer
            .issue(one_time("A1", ApprovalType::Preapproved, 3), &g.key, issued())
            .unwrap();

        let mut text = token.into_string();
        let last = text.pop().unwrap();
        text.push(if last == 'A' { 'B' } else { 'A' });

        assert_eq!(
            g.verifier.verify(&g.key, &Token::new(text), at(3, 10)),
            AdmissionDecision::deny(DenyReason::InvalidToken)
        );
    }

    #[test]
    fn test_token_from_another_deployment_is_invalid() {
        let g = gate();
        let (_, token) = g
            .issuer
            .issue(one_time("A1", ApprovalType::Preapproved, 3), &g.key, issued())
            .unwrap();
        let other_key = CredentialKey::from_bytes(&[0x43; KEY_LEN]).unwrap();

        assert_eq!(
            g.verifier.verify(&other_key, &token, at(3, 10)),
            AdmissionDecision::deny(DenyReason::InvalidToken)
        );
    }

    #[test]
    fn test_authentic_garbage_is_malformed() {
        let g = gate();
        let token = seal(&g.key, b"definitely not a visit record").unwrap();

        assert_eq!(
            g.verifier.verify(&g.key, &token, at(3, 10)),
            AdmissionDecision::deny(DenyReason::MalformedRecord)
        );
    }

    #[test]
    fn test_record_without_state_is_unknown() {
        let g = gate();
        let record = VisitRecord::issue(one_time("A1", ApprovalType::Preapproved, 3), issued()).unwrap();
        let token = seal(&g.key, &encode(&record).unwrap()).unwrap();

        assert_eq!(
            g.verifier.verify(&g.key, &token, at(3, 10)),
            AdmissionDecision::deny(DenyReason::UnknownGuest)
        );
    }

    /// A token for the right guest id but different visit details must not
    /// borrow that visit's approval.
    #[test]
    fn test_forged_record_for_known_guest_is_invalid() {
        let g = gate();
        let (record, _) = g
            .issuer
            .issue(one_time("A1", ApprovalType::Preapproved, 3), &g.key, issued())
            .unwrap();

        let mut forged = record.clone();
        forged.valid_to = ValidityBound::on(day(30));
        let token = seal(&g.key, &encode(&forged).unwrap()).unwrap();

        assert_eq!(
            g.verifier.verify(&g.key, &token, at(3, 10)),
            AdmissionDecision::deny(DenyReason::InvalidToken)
        );
    }

    // ── Keyring ───────────────────────────────────────────────────────────────

    #[test]
    fn test_override_apartment_pass_admits_through_keyring() {
        let g = gate();
        let (keyring, b2_key) = keyring();
        let (_, token) = g
            .issuer
            .issue(one_time("B2", ApprovalType::Preapproved, 3), &b2_key, issued())
            .unwrap();

        assert_eq!(
            g.verifier.verify(keyring.default_key(), &token, at(3, 10)),
            AdmissionDecision::deny(DenyReason::InvalidToken)
        );
        assert_eq!(
            g.verifier.verify_with_keyring(&keyring, &token, at(3, 10)),
            AdmissionDecision::Admit
        );
    }

    #[test]
    fn test_default_key_apartment_admits_through_keyring() {
        let g = gate();
        let (keyring, _) = keyring();
        let (_, token) = g
            .issuer
            .issue(one_time("A1", ApprovalType::Preapproved, 3), keyring.default_key(), issued())
            .unwrap();

        assert_eq!(
            g.verifier.verify_with_keyring(&keyring, &token, at(3, 10)),
            AdmissionDecision::Admit
        );
    }

    /// B2 has its own key, so a B2 pass under the deployment key was not
    /// issued by this deployment's B2 issuer.
    #[test]
    fn test_pass_under_wrong_apartment_key_is_invalid() {
        let g = gate();
        let (keyring, b2_key) = keyring();
        let (_, under_default) = g
            .issuer
            .issue(one_time("B2", ApprovalType::Preapproved, 3), keyring.default_key(), issued())
            .unwrap();
        let (_, under_b2) = g
            .issuer
            .issue(one_time("A1", ApprovalType::Preapproved, 3), &b2_key, issued())
            .unwrap();

        assert_eq!(
            g.verifier.verify_with_keyring(&keyring, &under_default, at(3, 10)),
            AdmissionDecision::deny(DenyReason::InvalidToken)
        );
        assert_eq!(
            g.verifier.verify_with_keyring(&keyring, &under_b2, at(3, 10)),
            AdmissionDecision::deny(DenyReason::InvalidToken)
        );
    }

    #[test]
    fn test_unconfigured_key_is_invalid_through_keyring() {
        let g = gate();
        let (keyring, _) = keyring();
        let stranger = CredentialKey::from_bytes(&[0x99; KEY_LEN]).unwrap();
        let (_, token) = g
            .issuer
            .issue(one_time("A1", ApprovalType::Preapproved, 3), &stranger, issued())
            .unwrap();

        assert_eq!(
            g.verifier.verify_with_keyring(&keyring, &token, at(3, 10)),
            AdmissionDecision::deny(DenyReason::InvalidToken)
        );
    }

    #[test]
    fn test_authentic_garbage_is_malformed_through_keyring() {
        let g = gate();
        let (keyring, b2_key) = keyring();
        let token = seal(&b2_key, b"not a record either").unwrap();

        assert_eq!(
            g.verifier.verify_with_keyring(&keyring, &token, at(3, 10)),
            AdmissionDecision::deny(DenyReason::MalformedRecord)
        );
    }

    // ── Issuance ──────────────────────────────────────────────────────────────

    #[test]
    fn test_issue_sets_initial_status() {
        let g = gate();
        let (pending, _) = g.issuer.issue(frequent(2, 9), &g.key, issued()).unwrap();
        let (approved, _) = g
            .issuer
            .issue(one_time("A1", ApprovalType::Preapproved, 3), &g.key, issued())
            .unwrap();

        assert_eq!(
            g.lifecycle.get(&pending.guest_id).unwrap().status,
            LifecycleStatus::PendingApproval
        );
        assert_eq!(
            g.lifecycle.get(&approved.guest_id).unwrap().status,
            LifecycleStatus::Approved
        );
    }

    #[test]
    fn test_invalid_request_creates_nothing() {
        let g = gate();
        let request = frequent(9, 2);

        let result = g.issuer.issue(request, &g.key, issued());

        assert!(matches!(result, Err(GatepassError::InvalidRequest { .. })));
        assert_eq!(g.audit.export_log().unwrap().events.len(), 0);
    }

    #[test]
    fn test_reissued_token_admits_same_visit() {
        let g = gate();
        let (record, first) = g
            .issuer
            .issue(one_time("A1", ApprovalType::Preapproved, 3), &g.key, issued())
            .unwrap();

        let second = g.issuer.reissue(&record.guest_id, &g.key).unwrap();

        assert_ne!(first, second);
        assert_eq!(g.verifier.verify(&g.key, &second, at(3, 10)), AdmissionDecision::Admit);
        assert_eq!(g.verifier.verify(&g.key, &first, at(3, 11)), AdmissionDecision::Admit);
    }

    #[test]
    fn test_reissue_of_unknown_guest_fails() {
        let g = gate();
        let result = g.issuer.reissue(&gatepass_contracts::visit::GuestId::new(), &g.key);

        assert!(matches!(result, Err(GatepassError::Store(StoreError::NotFound { .. }))));
    }

    // ── Concurrency ───────────────────────────────────────────────────────────

    /// Many gates scanning many guests at once: every scan inside the window
    /// admits and every visit ends up active exactly once.
    #[test]
    fn test_parallel_gates_share_one_lifecycle() {
        let g = gate();
        let tokens: Vec<_> = (0..6)
            .map(|i| {
                g.issuer
                    .issue(one_time(&format!("C{i}"), ApprovalType::Preapproved, 3), &g.key, issued())
                    .unwrap()
            })
            .collect();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for (_, token) in &tokens {
                        assert_eq!(g.verifier.verify(&g.key, token, at(3, 12)), AdmissionDecision::Admit);
                    }
                });
            }
        });

        let log = g.audit.export_log().unwrap();
        let activations = log.events.iter().filter(|e| e.record.event == "activate").count();
        assert_eq!(activations, tokens.len());
        assert!(g.audit.verify_integrity());
    }
}
