//! # gatepass-store
//!
//! Adapters for the GATEPASS lifecycle ports.
//!
//! - [`InMemoryLifecycleStore`]: version-checked lifecycle state held in
//!   process memory. Anything that can do a per-key compare-and-set on a
//!   version number can implement
//!   [`LifecycleStore`](gatepass_core::traits::LifecycleStore) instead.
//! - [`SystemClock`]: the host wall clock, for audit timestamps.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gatepass_store::{InMemoryLifecycleStore, SystemClock};
//!
//! let store = Arc::new(InMemoryLifecycleStore::new());
//! let lifecycle = GuestLifecycle::new(store, audit, Arc::new(SystemClock));
//! ```

pub mod clock;
pub mod memory;

pub use clock::SystemClock;
pub use memory::InMemoryLifecycleStore;
