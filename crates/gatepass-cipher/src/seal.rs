//! Sealing and opening tokens.
//!
//! Token layout before text encoding:
//!
//!   ciphertext ‖ 16-byte Poly1305 tag ‖ 24-byte XChaCha20 nonce
//!
//! The whole thing is then written as unpadded URL-safe base64. A fresh
//! random nonce is drawn for every seal, so sealing the same record twice
//! yields unrelated tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL, Engine as _};
use chacha20poly1305::{
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
    Key, XChaCha20Poly1305, XNonce,
};
use tracing::debug;

use gatepass_contracts::{error::CipherError, token::Token};

use crate::key::CredentialKey;

/// XChaCha20-Poly1305 nonce size (24 bytes)
pub const NONCE_LEN: usize = 24;

/// Poly1305 authentication tag size (16 bytes)
pub const TAG_LEN: usize = 16;

/// Associated data binding tokens to this credential format.
const TOKEN_AAD: &[u8] = b"gatepass/credential/v1";

/// Encrypt and authenticate `plaintext` under `key`.
///
/// Only fails if the AEAD primitive rejects the input, which for
/// credential-sized payloads does not happen in practice.
pub fn seal(key: &CredentialKey, plaintext: &[u8]) -> Result<Token, CipherError> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);

    let mut sealed = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: plaintext,
                aad: TOKEN_AAD,
            },
        )
        .map_err(|_| CipherError::SealFailed)?;
    sealed.extend_from_slice(&nonce);

    Ok(Token::new(BASE64URL.encode(sealed)))
}

/// Verify and decrypt `token` under `key`.
///
/// Fails closed with `CipherError::InvalidToken` on malformed base64, a
/// token too short to hold a tag and nonce, or any authentication failure.
/// No plaintext is returned unless the tag verifies.
pub fn open(key: &CredentialKey, token: &Token) -> Result<Vec<u8>, CipherError> {
    let raw = BASE64URL.decode(token.as_str()).map_err(|e| {
        debug!(error = %e, "token is not valid base64url");
        CipherError::InvalidToken
    })?;

    if raw.len() < TAG_LEN + NONCE_LEN {
        debug!(len = raw.len(), "token too short to hold tag and nonce");
        return Err(CipherError::InvalidToken);
    }

    let (ciphertext, nonce) = raw.split_at(raw.len() - NONCE_LEN);
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

    cipher
        .decrypt(
            XNonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad: TOKEN_AAD,
            },
        )
        .map_err(|_| {
            debug!(key = %key.fingerprint(), "token failed authentication");
            CipherError::InvalidToken
        })
}
