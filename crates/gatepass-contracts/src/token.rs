//! The externally carried credential text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A sealed credential in URL-safe text form, ready for a QR code or link.
///
/// Tokens are opaque to everything except the cipher. They are never
/// mutated, and holding one proves nothing until it has been opened and
/// checked against lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Wrap scanned or received text. No validation happens here; a bad
    /// token is only detected when the cipher tries to open it.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The token text, for rendering as a QR code or link.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for Token {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for Token {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
