//! On-disk configuration schema.
//!
//! These types mirror the TOML document one-to-one. Nothing here is
//! validated; `GateConfig` turns a `ConfigFile` into checked values.
//!
//! ```toml
//! [deployment]
//! name = "maple-court"
//! key = "<64 hex chars>"
//!
//! [lifecycle]
//! max_conflict_retries = 8
//!
//! [[apartments]]
//! id = "A1"
//! key = "<64 hex chars>"   # optional
//! ```

use serde::{Deserialize, Serialize};

use gatepass_core::DEFAULT_MAX_CONFLICT_RETRIES;

/// The whole configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub deployment: DeploymentSection,

    #[serde(default)]
    pub lifecycle: LifecycleSection,

    #[serde(default)]
    pub apartments: Vec<ApartmentSection>,
}

/// `[deployment]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeploymentSection {
    /// Deployment name; also used as the audit ledger id.
    pub name: String,

    /// Default sealing key for every apartment, as 64 hex characters.
    pub key: String,
}

/// `[lifecycle]`, optional as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LifecycleSection {
    #[serde(default = "default_retries")]
    pub max_conflict_retries: u32,
}

impl Default for LifecycleSection {
    fn default() -> Self {
        Self {
            max_conflict_retries: default_retries(),
        }
    }
}

fn default_retries() -> u32 {
    DEFAULT_MAX_CONFLICT_RETRIES
}

/// One `[[apartments]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApartmentSection {
    /// Apartment id as printed on the door, e.g. "A1".
    pub id: String,

    /// Per-apartment key override.
    #[serde(default)]
    pub key: Option<String>,
}
