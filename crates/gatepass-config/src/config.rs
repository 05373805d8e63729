//! Loading and validating deployment configuration.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use gatepass_cipher::CredentialKey;
use gatepass_contracts::{
    error::{GatepassError, GatepassResult},
    visit::ApartmentId,
};

use crate::{keyring::Keyring, schema::ConfigFile};

fn config_error(reason: impl Into<String>) -> GatepassError {
    GatepassError::ConfigError {
        reason: reason.into(),
    }
}

fn parse_key(hex: &str, what: &str) -> GatepassResult<CredentialKey> {
    CredentialKey::from_hex(hex).map_err(|e| match e {
        GatepassError::ConfigError { reason } => config_error(format!("{what}: {reason}")),
        other => other,
    })
}

/// A validated GATEPASS deployment configuration.
///
/// Construct via `from_toml_str` or `from_file`. Every key has been parsed
/// and length-checked by the time a `GateConfig` exists.
///
/// ```rust,ignore
/// use gatepass_config::GateConfig;
///
/// let config = GateConfig::from_file(Path::new("config/community.toml"))?;
/// let keyring = config.keyring();
/// ```
#[derive(Debug, Clone)]
pub struct GateConfig {
    name: String,
    max_conflict_retries: u32,
    apartments: Vec<ApartmentId>,
    keyring: Keyring,
}

impl GateConfig {
    /// Parse and validate a TOML document.
    ///
    /// Returns `GatepassError::ConfigError` for malformed TOML, unknown
    /// fields, a blank deployment name, bad or wrong-length keys, duplicate
    /// apartment ids, or `max_conflict_retries = 0`.
    pub fn from_toml_str(s: &str) -> GatepassResult<Self> {
        let file: ConfigFile = toml::from_str(s)
            .map_err(|e| config_error(format!("failed to parse gate config TOML: {}", e)))?;
        Self::from_file_schema(file)
    }

    /// Read the file at `path` and parse it as gate configuration.
    pub fn from_file(path: &Path) -> GatepassResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            config_error(format!("failed to read config file '{}': {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "loaded gate config file");
        Self::from_toml_str(&contents)
    }

    fn from_file_schema(file: ConfigFile) -> GatepassResult<Self> {
        let name = file.deployment.name.trim().to_string();
        if name.is_empty() {
            return Err(config_error("deployment name must not be blank"));
        }

        if file.lifecycle.max_conflict_retries == 0 {
            return Err(config_error("lifecycle.max_conflict_retries must be at least 1"));
        }

        let default_key = parse_key(&file.deployment.key, "deployment key")?;
        let mut keyring = Keyring::single(default_key);

        let mut seen = HashSet::new();
        let mut apartments = Vec::with_capacity(file.apartments.len());
        for apartment in file.apartments {
            let id = ApartmentId::new(apartment.id.trim());
            if id.as_str().is_empty() {
                return Err(config_error("apartment id must not be blank"));
            }
            if !seen.insert(id.clone()) {
                return Err(config_error(format!("duplicate apartment id '{}'", id)));
            }

            if let Some(hex) = apartment.key {
                let key = parse_key(&hex, &format!("key for apartment '{id}'"))?;
                keyring = keyring.with_override(id.clone(), key);
            }
            apartments.push(id);
        }

        info!(
            deployment = %name,
            apartments = apartments.len(),
            key = %keyring.default_key().fingerprint(),
            "gate config loaded"
        );

        Ok(Self {
            name,
            max_conflict_retries: file.lifecycle.max_conflict_retries,
            apartments,
            keyring,
        })
    }

    /// Deployment name, trimmed. Also the audit ledger id.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How many version conflicts a lifecycle transition absorbs before
    /// giving up. Always at least 1.
    pub fn max_conflict_retries(&self) -> u32 {
        self.max_conflict_retries
    }

    /// Apartments listed in the configuration, in declaration order.
    pub fn apartments(&self) -> &[ApartmentId] {
        &self.apartments
    }

    /// A copy of the deployment keyring.
    pub fn keyring(&self) -> Keyring {
        self.keyring.clone()
    }
}
