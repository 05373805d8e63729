//! Apartment to key resolution.

use std::collections::HashMap;

use gatepass_cipher::CredentialKey;
use gatepass_contracts::visit::ApartmentId;

/// Resolves the sealing key for an apartment: its own override if one is
/// configured, otherwise the deployment default.
#[derive(Debug, Clone)]
pub struct Keyring {
    default_key: CredentialKey,
    overrides: HashMap<ApartmentId, CredentialKey>,
}

impl Keyring {
    /// A keyring where every apartment uses `default_key`.
    pub fn single(default_key: CredentialKey) -> Self {
        Self {
            default_key,
            overrides: HashMap::new(),
        }
    }

    /// Add or replace one apartment's override.
    pub fn with_override(mut self, apartment_id: ApartmentId, key: CredentialKey) -> Self {
        self.overrides.insert(apartment_id, key);
        self
    }

    /// The key that seals and opens credentials for `apartment_id`.
    pub fn key_for(&self, apartment_id: &ApartmentId) -> &CredentialKey {
        self.overrides.get(apartment_id).unwrap_or(&self.default_key)
    }

    /// True if `apartment_id` has its own key.
    pub fn has_override(&self, apartment_id: &ApartmentId) -> bool {
        self.overrides.contains_key(apartment_id)
    }

    /// The deployment-wide key.
    pub fn default_key(&self) -> &CredentialKey {
        &self.default_key
    }

    /// Every key a gate may have to try on a scanned token:
    /// apartment overrides first, the deployment key last.
    ///
    /// Tokens carry no key id, so a gate that serves apartments with their
    /// own keys cannot know up front which key a token was sealed under.
    pub fn candidates(&self) -> impl Iterator<Item = &CredentialKey> {
        self.overrides
            .values()
            .chain(std::iter::once(&self.default_key))
    }

    /// True if `key` is the one configured for `apartment_id`.
    pub fn is_key_for(&self, apartment_id: &ApartmentId, key: &CredentialKey) -> bool {
        self.key_for(apartment_id).fingerprint() == key.fingerprint()
    }
}
