//! Gated-community demo scenarios.
//!
//! Each scenario builds a fresh `Community` from the embedded Maple Court
//! configuration, issues passes, scans them at the gate at fixed times, and
//! reports what the guard would see.

use std::sync::Arc;

use tracing::debug;

use gatepass_audit::InMemoryAuditWriter;
use gatepass_cipher::CredentialKey;
use gatepass_config::{GateConfig, Keyring};
use chrono::NaiveDateTime;

use gatepass_contracts::{
    decision::AdmissionDecision, error::GatepassResult, token::Token, visit::ApartmentId,
};
use gatepass_core::GuestLifecycle;
use gatepass_store::{InMemoryLifecycleStore, SystemClock};
use gatepass_verify::{CredentialIssuer, GateVerifier};

pub mod approval_flow;
pub mod one_time_guest;
pub mod revocation;

/// Embedded Maple Court deployment configuration.
pub const COMMUNITY_CONFIG: &str = include_str!("../../config/community.toml");

/// One gate scan and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scan {
    pub label: String,
    pub decision: AdmissionDecision,
}

/// Every component of one community deployment, wired together.
pub struct Community {
    pub config: GateConfig,
    pub keyring: Keyring,
    pub audit: Arc<InMemoryAuditWriter>,
    pub lifecycle: Arc<GuestLifecycle>,
    pub issuer: CredentialIssuer,
    pub verifier: GateVerifier,
}

impl Community {
    /// Wire a fresh in-memory deployment for `config`.
    pub fn from_config(config: GateConfig) -> Self {
        let audit = Arc::new(InMemoryAuditWriter::new(config.name()));
        let lifecycle = Arc::new(
            GuestLifecycle::new(
                Arc::new(InMemoryLifecycleStore::new()),
                audit.clone(),
                Arc::new(SystemClock),
            )
            .with_max_conflict_retries(config.max_conflict_retries()),
        );

        debug!(
            deployment = %config.name(),
            apartments = config.apartments().len(),
            "community components wired"
        );

        Self {
            keyring: config.keyring(),
            issuer: CredentialIssuer::new(lifecycle.clone()),
            verifier: GateVerifier::new(lifecycle.clone()),
            config,
            audit,
            lifecycle,
        }
    }

    /// The Maple Court reference deployment.
    pub fn maple_court() -> GatepassResult<Self> {
        Ok(Self::from_config(GateConfig::from_toml_str(COMMUNITY_CONFIG)?))
    }

    /// The key the resident app of `apartment` seals passes with.
    pub fn key_for(&self, apartment: &str) -> &CredentialKey {
        self.keyring.key_for(&ApartmentId::new(apartment))
    }

    /// Scan `token` at the community gate, which holds the whole keyring.
    pub fn scan(&self, label: &str, token: &Token, now: NaiveDateTime) -> Scan {
        Scan {
            label: label.to_string(),
            decision: self.verifier.verify_with_keyring(&self.keyring, token, now),
        }
    }
}

/// Print one scan the way the guard's screen shows it.
pub(crate) fn print_scan(scan: &Scan) {
    match &scan.decision {
        AdmissionDecision::Admit => println!("  {:<40} ADMIT", scan.label),
        AdmissionDecision::Deny { reason } => {
            println!("  {:<40} DENY ({})", scan.label, reason.describe())
        }
    }
}

/// Print the ledger summary shared by every scenario.
pub(crate) fn print_audit_summary(community: &Community) -> GatepassResult<()> {
    let log = community.audit.export_log()?;
    println!();
    println!(
        "  Audit ledger '{}':  {} ({} transition(s) in chain)",
        log.ledger_id,
        if community.audit.verify_integrity() { "VERIFIED" } else { "FAILED" },
        log.events.len()
    );
    Ok(())
}
