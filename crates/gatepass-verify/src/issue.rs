//! Credential issuance: record, lifecycle state and token in one step.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use gatepass_cipher::{seal, CredentialKey};
use gatepass_codec::encode;
use gatepass_contracts::{
    error::GatepassResult,
    token::Token,
    visit::{GuestId, IssueRequest, VisitRecord},
};
use gatepass_core::GuestLifecycle;

/// Issues guest credentials on behalf of residents.
pub struct CredentialIssuer {
    lifecycle: Arc<GuestLifecycle>,
}

impl CredentialIssuer {
    /// An issuer registering new visits with `lifecycle`.
    pub fn new(lifecycle: Arc<GuestLifecycle>) -> Self {
        Self { lifecycle }
    }

    /// Build a visit from `request`, register its lifecycle state, and seal
    /// it into a token under `key`.
    ///
    /// The token is produced before the state is created, so a failure at
    /// any step leaves nothing behind in the store.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` when the request breaks a visit invariant, `Cipher`
    /// when sealing fails, and whatever the lifecycle returns from `create`.
    pub fn issue(
        &self,
        request: IssueRequest,
        key: &CredentialKey,
        issued_at: DateTime<Utc>,
    ) -> GatepassResult<(VisitRecord, Token)> {
        let record = VisitRecord::issue(request, issued_at)?;
        let token = seal(key, &encode(&record)?)?;
        let state = self.lifecycle.create(record.clone())?;

        info!(
            guest_id = %record.guest_id,
            apartment_id = %record.apartment_id,
            guest_type = ?record.guest_type,
            status = %state.status,
            "credential issued"
        );

        Ok((record, token))
    }

    /// Seal the stored record for `guest_id` into a fresh token, e.g. to
    /// resend a pass. Earlier tokens for the same visit stay valid.
    pub fn reissue(&self, guest_id: &GuestId, key: &CredentialKey) -> GatepassResult<Token> {
        let state = self.lifecycle.get(guest_id)?;
        let token = seal(key, &encode(&state.record)?)?;

        info!(guest_id = %guest_id, status = %state.status, "credential resealed");
        Ok(token)
    }
}
