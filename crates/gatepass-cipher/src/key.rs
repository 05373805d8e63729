//! Credential key material.
//!
//! A `CredentialKey` is the 256-bit symmetric key one deployment (or one
//! apartment) seals its credentials with. Keys are provisioned by the
//! configuration layer; this module only validates and holds them.
//!
//! Rotating a key invalidates every token sealed under the old one that has
//! not been scanned yet. There is no key-id in the token, so an operator
//! rotating keys must reissue outstanding passes.

use std::fmt;

use chacha20poly1305::aead::{rand_core::RngCore, OsRng};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use gatepass_contracts::error::{GatepassError, GatepassResult};

/// XChaCha20-Poly1305 key size (32 bytes)
pub const KEY_LEN: usize = 32;

/// A 256-bit credential sealing key. Zeroized on drop.
#[derive(Clone)]
pub struct CredentialKey([u8; KEY_LEN]);

impl CredentialKey {
    /// Wrap raw key bytes.
    ///
    /// Returns `GatepassError::ConfigError` unless `bytes` is exactly
    /// `KEY_LEN` long.
    pub fn from_bytes(bytes: &[u8]) -> GatepassResult<Self> {
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|_| GatepassError::ConfigError {
            reason: format!("credential key must be {} bytes, got {}", KEY_LEN, bytes.len()),
        })?;
        Ok(Self(key))
    }

    /// Parse a key from 64 hex characters.
    pub fn from_hex(text: &str) -> GatepassResult<Self> {
        let mut bytes = hex::decode(text.trim()).map_err(|e| GatepassError::ConfigError {
            reason: format!("credential key is not valid hex: {}", e),
        })?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    /// Generate a fresh random key from the operating system RNG.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        Self(key)
    }

    /// Lowercase hex of the key, for provisioning output only.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short, non-secret identifier for logs: first 8 bytes of SHA-256(key).
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0);
        hex::encode(&digest[..8])
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for CredentialKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CredentialKey({})", self.fingerprint())
    }
}
