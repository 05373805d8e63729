//! # gatepass-cipher
//!
//! Authenticated encryption of GATEPASS credentials.
//!
//! [`seal`] turns canonical record bytes into a URL-safe [`Token`] using
//! XChaCha20-Poly1305 with a fresh random nonce; [`open`] reverses it and
//! fails closed with a single, detail-free `CipherError::InvalidToken`.
//! Both are pure and safe to call from any number of threads.
//!
//! [`Token`]: gatepass_contracts::token::Token
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gatepass_cipher::{open, seal, CredentialKey};
//!
//! let key = CredentialKey::from_hex(&hex_from_config)?;
//! let token = seal(&key, &record_bytes)?;
//! assert_eq!(open(&key, &token)?, record_bytes);
//! ```

pub mod key;
pub mod seal;

pub use key::{CredentialKey, KEY_LEN};
pub use seal::{open, seal, NONCE_LEN, TAG_LEN};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL, Engine as _};
    use proptest::prelude::*;

    use gatepass_contracts::{
        error::{CipherError, GatepassError},
        token::Token,
    };

    use super::{open, seal, CredentialKey, KEY_LEN, NONCE_LEN, TAG_LEN};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn key(fill: u8) -> CredentialKey {
        CredentialKey::from_bytes(&[fill; KEY_LEN]).unwrap()
    }

    /// Flip one bit of the decoded token bytes and re-encode.
    fn flip_raw_bit(token: &Token, bit: usize) -> Token {
        let mut raw = BASE64URL.decode(token.as_str()).unwrap();
        raw[bit / 8] ^= 1 << (bit % 8);
        Token::new(BASE64URL.encode(raw))
    }

    // ── Round trip ────────────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn test_open_inverts_seal(plaintext in proptest::collection::vec(any::<u8>(), 0..512), fill in any::<u8>()) {
            let k = key(fill);
            let token = seal(&k, &plaintext).unwrap();
            prop_assert_eq!(open(&k, &token).unwrap(), plaintext);
        }

        /// Any single-bit change anywhere in the sealed bytes (ciphertext,
        /// tag, or nonce) is rejected.
        #[test]
        fn test_any_flipped_bit_is_rejected(plaintext in proptest::collection::vec(any::<u8>(), 1..128), bit_seed in any::<usize>()) {
            let k = key(3);
            let token = seal(&k, &plaintext).unwrap();
            let total_bits = (plaintext.len() + TAG_LEN + NONCE_LEN) * 8;

            let tampered = flip_raw_bit(&token, bit_seed % total_bits);
            prop_assert_eq!(open(&k, &tampered), Err(CipherError::InvalidToken));
        }
    }

    #[test]
    fn test_token_length_matches_layout() {
        let token = seal(&key(1), &[0u8; 80]).unwrap();
        let raw = BASE64URL.decode(token.as_str()).unwrap();

        assert_eq!(raw.len(), 80 + TAG_LEN + NONCE_LEN);
    }

    #[test]
    fn test_token_text_is_url_safe() {
        let token = seal(&key(1), &[0xfb; 200]).unwrap();

        assert!(token
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_sealing_twice_uses_fresh_nonces() {
        let k = key(1);
        let a = seal(&k, b"same record").unwrap();
        let b = seal(&k, b"same record").unwrap();

        assert_ne!(a, b);
        assert_eq!(open(&k, &a).unwrap(), open(&k, &b).unwrap());
    }

    // ── Fail-closed behaviour ─────────────────────────────────────────────────

    #[test]
    fn test_wrong_key_is_rejected() {
        let token = seal(&key(1), b"visit").unwrap();

        assert_eq!(open(&key(2), &token), Err(CipherError::InvalidToken));
    }

    /// Flipping any of the low seven bits of any token character keeps the
    /// text ASCII but must still be rejected, whether the result is bad
    /// base64 or a well-formed token that fails authentication.
    #[test]
    fn test_every_text_bit_flip_is_rejected() {
        let k = key(9);
        let token = seal(&k, b"guest visit record").unwrap();
        let text = token.as_str().as_bytes().to_vec();

        for pos in 0..text.len() {
            for bit in 0..7 {
                let mut tampered = text.clone();
                tampered[pos] ^= 1 << bit;
                let tampered = Token::new(String::from_utf8(tampered).unwrap());
                assert_eq!(
                    open(&k, &tampered),
                    Err(CipherError::InvalidToken),
                    "flip at char {pos} bit {bit} was accepted"
                );
            }
        }
    }

    #[test]
    fn test_malformed_base64_is_rejected() {
        assert_eq!(open(&key(1), &Token::from("%%%not-a-token%%%")), Err(CipherError::InvalidToken));
        assert_eq!(open(&key(1), &Token::from("")), Err(CipherError::InvalidToken));
    }

    #[test]
    fn test_truncated_token_is_rejected() {
        let k = key(1);
        let token = seal(&k, b"visit").unwrap();
        let raw = BASE64URL.decode(token.as_str()).unwrap();

        for len in [0, 1, TAG_LEN + NONCE_LEN - 1, raw.len() - 1] {
            let truncated = Token::new(BASE64URL.encode(&raw[..len]));
            assert_eq!(open(&k, &truncated), Err(CipherError::InvalidToken), "len {len}");
        }
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    #[test]
    fn test_key_from_hex_round_trips() {
        let generated = CredentialKey::generate();
        let parsed = CredentialKey::from_hex(&generated.to_hex()).unwrap();

        assert_eq!(parsed.to_hex(), generated.to_hex());
        assert_eq!(parsed.fingerprint(), generated.fingerprint());
    }

    #[test]
    fn test_wrong_length_key_is_a_config_error() {
        match CredentialKey::from_hex("abcd") {
            Err(GatepassError::ConfigError { reason }) => assert!(reason.contains("32 bytes")),
            other => panic!("expected ConfigError, got {:?}", other),
        }
        assert!(matches!(
            CredentialKey::from_hex("zz"),
            Err(GatepassError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_debug_output_does_not_leak_key() {
        let k = key(0xab);
        let shown = format!("{:?}", k);

        assert!(!shown.contains(&k.to_hex()));
        assert!(shown.contains(&k.fingerprint()));
    }
}
