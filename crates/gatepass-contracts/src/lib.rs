//! # gatepass-contracts
//!
//! Shared types, error taxonomy, and contracts for the GATEPASS guest
//! credential runtime.
//!
//! All crates in the workspace import from here. Apart from record
//! construction and window arithmetic, no business logic lives in this
//! crate; only data definitions and error types.

pub mod decision;
pub mod error;
pub mod lifecycle;
pub mod token;
pub mod transition;
pub mod visit;
