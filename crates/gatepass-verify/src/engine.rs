//! Gate-side verification of scanned credentials.
//!
//! `GateVerifier::verify` runs a fixed pipeline and stops at the first
//! failure:
//!
//! 1. **Open**: authenticate and decrypt the token. Any failure is
//!    `Deny(invalid_token)`.
//! 2. **Decode**: parse the canonical record. Any failure is
//!    `Deny(malformed_record)`.
//! 3. **Evaluate**: hand the decoded record to the lifecycle, which checks
//!    it against the stored visit and decides on status and time window.
//!
//! `GateVerifier::verify_with_keyring` is the same pipeline for a gate that
//! serves apartments with their own keys. The open step tries every key in
//! the keyring, and a record that opened under a key other than its own
//! apartment's is `Deny(invalid_token)`.
//!
//! Cryptographic and parse details never leave this module; callers only see
//! the coarse deny reason.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use gatepass_cipher::{open, CredentialKey};
use gatepass_codec::decode;
use gatepass_config::Keyring;
use gatepass_contracts::{
    decision::{AdmissionDecision, DenyReason},
    token::Token,
    visit::VisitRecord,
};
use gatepass_core::GuestLifecycle;

/// Verifies tokens presented at a gate. Holds no state of its own.
pub struct GateVerifier {
    lifecycle: Arc<GuestLifecycle>,
}

impl GateVerifier {
    /// A verifier that decides against the state held by `lifecycle`.
    pub fn new(lifecycle: Arc<GuestLifecycle>) -> Self {
        Self { lifecycle }
    }

    /// Decide whether the holder of `token` may enter at `now`.
    ///
    /// `now` is local time at the gate. Never fails; every problem becomes
    /// a `Deny` with a reason safe to show at the gate.
    pub fn verify(&self, key: &CredentialKey, token: &Token, now: NaiveDateTime) -> AdmissionDecision {
        let plaintext = match open(key, token) {
            Ok(bytes) => bytes,
            Err(_) => {
                warn!(key = %key.fingerprint(), "scanned token rejected");
                return AdmissionDecision::deny(DenyReason::InvalidToken);
            }
        };

        match decode_record(&plaintext) {
            Ok(record) => self.evaluate(&record, now),
            Err(denied) => denied,
        }
    }

    /// Like [`verify`](Self::verify), resolving the key from `keyring`.
    ///
    /// Apartment overrides are tried before the deployment key. The token is
    /// accepted only if the key that opened it is the one configured for the
    /// apartment named inside the record.
    pub fn verify_with_keyring(
        &self,
        keyring: &Keyring,
        token: &Token,
        now: NaiveDateTime,
    ) -> AdmissionDecision {
        let opened = keyring
            .candidates()
            .find_map(|key| open(key, token).ok().map(|plaintext| (key, plaintext)));
        let Some((key, plaintext)) = opened else {
            warn!(
                keys = keyring.candidates().count(),
                "scanned token opened under no configured key"
            );
            return AdmissionDecision::deny(DenyReason::InvalidToken);
        };

        let record = match decode_record(&plaintext) {
            Ok(record) => record,
            Err(denied) => return denied,
        };

        if !keyring.is_key_for(&record.apartment_id, key) {
            warn!(
                guest_id = %record.guest_id,
                apartment_id = %record.apartment_id,
                key = %key.fingerprint(),
                "token sealed under a key not configured for its apartment"
            );
            return AdmissionDecision::deny(DenyReason::InvalidToken);
        }

        self.evaluate(&record, now)
    }

    fn evaluate(&self, record: &VisitRecord, now: NaiveDateTime) -> AdmissionDecision {
        debug!(
            guest_id = %record.guest_id,
            apartment_id = %record.apartment_id,
            "token opened, evaluating lifecycle"
        );

        let decision = self.lifecycle.evaluate_presented(record, now);
        info!(
            guest_id = %record.guest_id,
            apartment_id = %record.apartment_id,
            decision = %decision,
            "gate decision"
        );
        decision
    }
}

fn decode_record(plaintext: &[u8]) -> Result<VisitRecord, AdmissionDecision> {
    decode(plaintext).map_err(|e| {
        warn!("authenticated token carried an unreadable record");
        debug!(error = %e, "record decode failure");
        AdmissionDecision::deny(DenyReason::MalformedRecord)
    })
}
