//! # gatepass-core
//!
//! The guest lifecycle for GATEPASS visits.
//!
//! This crate provides:
//! - The two trust-boundary traits (`LifecycleStore`, `AuditWriter`)
//! - The pure transition table and window assessment in `machine`
//! - `GuestLifecycle`, which commits transitions through the store with
//!   optimistic version checks
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gatepass_core::{GuestLifecycle, traits::{AuditWriter, LifecycleStore}};
//!
//! let lifecycle = GuestLifecycle::new(store, audit, Arc::new(SystemClock));
//! lifecycle.create(record)?;
//! let decision = lifecycle.evaluate(&guest_id, now);
//! ```

pub mod lifecycle;
pub mod machine;
pub mod traits;

pub use lifecycle::{GuestLifecycle, DEFAULT_MAX_CONFLICT_RETRIES};
