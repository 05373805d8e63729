//! GATEPASS Gated-Community Reference Runtime: Demo and Operator CLI
//!
//! Runs the reference visitor scenarios, and offers the small operator
//! tools a deployment needs: generating keys, sealing a pass from a config
//! file, and inspecting what a pass contains.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- one-time-guest
//!   cargo run -p demo -- keygen
//!   cargo run -p demo -- issue --config gate.toml --apartment A1 --from 2026-03-09
//!   cargo run -p demo -- inspect --config gate.toml --apartment A1 --token <TOKEN>

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gatepass_cipher::{open, seal, CredentialKey};
use gatepass_codec::{decode, encode};
use gatepass_config::GateConfig;
use gatepass_contracts::{
    error::GatepassResult,
    token::Token,
    visit::{ApartmentId, ApprovalType, GuestType, IssueRequest, ValidityBound, VisitRecord},
};
use gatepass_ref_community::scenarios::{approval_flow, one_time_guest, revocation};

// ── CLI definition ────────────────────────────────────────────────────────────

/// GATEPASS: encrypted guest passes for gated communities.
#[derive(Parser)]
#[command(
    name = "gatepass",
    about = "GATEPASS guest credential demo and operator tools",
    long_about = "Runs GATEPASS reference scenarios showing issuance, approval,\n\
                  gate verification, revocation and audit chain integrity,\n\
                  and provides key and pass tooling for operators."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three reference scenarios in sequence.
    RunAll,
    /// Scenario 1: preapproved one-time guest.
    OneTimeGuest,
    /// Scenario 2: frequent guest awaiting resident approval.
    ApprovalFlow,
    /// Scenario 3: revocation and forged passes.
    Revocation,
    /// Print a fresh random credential key as hex.
    Keygen,
    /// Seal a pass for an apartment using the keys in a config file.
    ///
    /// Lifecycle state is not persisted by this command; it only shows the
    /// token a resident would receive.
    Issue {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        apartment: String,
        #[arg(long, value_enum, default_value_t = GuestKind::OneTime)]
        guest_type: GuestKind,
        #[arg(long, value_enum, default_value_t = ApprovalKind::Preapproved)]
        approval: ApprovalKind,
        /// First valid day (YYYY-MM-DD).
        #[arg(long)]
        from: NaiveDate,
        /// Last valid day (YYYY-MM-DD). Required for frequent guests.
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Open a pass with an apartment's key and print the visit it carries.
    Inspect {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        apartment: String,
        #[arg(long)]
        token: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum GuestKind {
    OneTime,
    Frequent,
}

impl From<GuestKind> for GuestType {
    fn from(kind: GuestKind) -> Self {
        match kind {
            GuestKind::OneTime => GuestType::OneTime,
            GuestKind::Frequent => GuestType::Frequent,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ApprovalKind {
    Preapproved,
    Private,
    NeedsApproval,
}

impl From<ApprovalKind> for ApprovalType {
    fn from(kind: ApprovalKind) -> Self {
        match kind {
            ApprovalKind::Preapproved => ApprovalType::Preapproved,
            ApprovalKind::Private => ApprovalType::Private,
            ApprovalKind::NeedsApproval => ApprovalType::NeedsApproval,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for pipeline detail.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::RunAll => run_all(),
        Command::OneTimeGuest => scenario(one_time_guest::run_scenario),
        Command::ApprovalFlow => scenario(approval_flow::run_scenario),
        Command::Revocation => scenario(revocation::run_scenario),
        Command::Keygen => {
            keygen();
            Ok(())
        }
        Command::Issue {
            config,
            apartment,
            guest_type,
            approval,
            from,
            to,
        } => issue(
            &config,
            IssueRequest {
                apartment_id: ApartmentId::new(apartment),
                guest_type: guest_type.into(),
                approval_type: approval.into(),
                valid_from: ValidityBound::on(from),
                valid_to: to.map(ValidityBound::on),
            },
        ),
        Command::Inspect {
            config,
            apartment,
            token,
        } => inspect(&config, &ApartmentId::new(apartment), &Token::new(token)),
    };

    if let Err(e) = result {
        eprintln!("gatepass error: {}", e);
        std::process::exit(1);
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

fn run_all() -> GatepassResult<()> {
    print_banner();
    one_time_guest::run_scenario()?;
    approval_flow::run_scenario()?;
    revocation::run_scenario()?;
    println!("All scenarios completed successfully.");
    Ok(())
}

fn scenario(run: fn() -> GatepassResult<()>) -> GatepassResult<()> {
    print_banner();
    run()
}

// ── Operator tools ────────────────────────────────────────────────────────────

fn keygen() {
    let key = CredentialKey::generate();
    println!("{}", key.to_hex());
    eprintln!("fingerprint: {}", key.fingerprint());
}

fn issue(config_path: &Path, request: IssueRequest) -> GatepassResult<()> {
    let config = GateConfig::from_file(config_path)?;
    let keyring = config.keyring();
    let key = keyring.key_for(&request.apartment_id);

    let record = VisitRecord::issue(request, Utc::now())?;
    let token = seal(key, &encode(&record)?)?;

    info!(
        guest_id = %record.guest_id,
        apartment_id = %record.apartment_id,
        key = %key.fingerprint(),
        "pass sealed"
    );
    print_record(&record);
    println!();
    println!("{}", token);
    Ok(())
}

fn inspect(config_path: &Path, apartment: &ApartmentId, token: &Token) -> GatepassResult<()> {
    let config = GateConfig::from_file(config_path)?;
    let keyring = config.keyring();

    let record = decode(&open(keyring.key_for(apartment), token)?)?;
    print_record(&record);
    Ok(())
}

fn print_record(record: &VisitRecord) {
    println!("  Guest:      {}", record.guest_id);
    println!("  Apartment:  {}", record.apartment_id);
    println!("  Guest type: {:?}", record.guest_type);
    println!("  Approval:   {:?}", record.approval_type);
    println!("  Valid:      {} .. {}", record.valid_from, record.valid_to);
    println!("  Issued:     {}", record.issued_at);
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("GATEPASS: Guest Access Credentials");
    println!("Maple Court Reference Demo");
    println!("==================================");
    println!();
    println!("Gate pipeline per scan:");
    println!("  [1] Open the pass: XChaCha20-Poly1305, fails closed on any change");
    println!("  [2] Decode the canonical visit record");
    println!("  [3] Match it against the stored visit and its lifecycle status");
    println!("  [4] Check the validity window; activate or expire as needed");
    println!("  [5] Every committed transition is appended to a SHA-256 audit chain");
    println!();
}
