//! # gatepass-codec
//!
//! Canonical, versioned binary encoding of GATEPASS visit records.
//!
//! The codec turns a [`VisitRecord`](gatepass_contracts::visit::VisitRecord)
//! into the exact byte string the cipher seals, and back. Encoding is
//! deterministic: two equal records always produce the same bytes. The first
//! byte is a format version so future fields can be added without breaking
//! scanners that are still on an older build.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gatepass_codec::{decode, encode};
//!
//! let bytes = encode(&record)?;
//! assert_eq!(decode(&bytes)?, record);
//! ```

pub mod canonical;

pub use canonical::{decode, encode, FORMAT_VERSION};

// ── Tests ─────────────────────────────────────────────────────────────────────
