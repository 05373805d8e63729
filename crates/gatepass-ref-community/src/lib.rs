//! # gatepass-ref-community
//!
//! Gated-community reference runtime for the GATEPASS guest credential
//! system.
//!
//! Demonstrates three visitor scenarios at "Maple Court" using mock data:
//!
//! 1. **Preapproved One-Time Guest**: multi-admit within the day, expiry
//!    the next morning.
//! 2. **Frequent Guest Awaiting Approval**: pending passes are refused
//!    until the resident approves; a denied request never admits.
//! 3. **Revocation and Forged Passes**: revocation beats the validity
//!    window; altered or foreign-key passes are invalid.
//!
//! All data is hardcoded and fictional. Scenario times are fixed.

pub mod mock_data;
pub mod scenarios;

// ── Tests ─────────────────────────────────────────────────────────────────────
