//! # gatepass-config
//!
//! TOML configuration for a GATEPASS deployment: its name, credential keys
//! and lifecycle tuning.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use gatepass_config::GateConfig;
//!
//! let config = GateConfig::from_file(Path::new("config/community.toml"))?;
//! let key = config.keyring().key_for(&apartment_id);
//! ```
//!
//! ## Keys
//!
//! `[deployment].key` seals credentials for every apartment. An
//! `[[apartments]]` entry may carry its own `key`, which then takes
//! precedence for that apartment only.

pub mod config;
pub mod keyring;
pub mod schema;

pub use config::GateConfig;
pub use keyring::Keyring;
pub use schema::ConfigFile;

// ── Tests ─────────────────────────────────────────────────────────────────────
