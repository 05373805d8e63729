//! Scenario 3: Revocation and Forged Passes
//!
//! C7 gives a contractor a private pass for the week, then falls out with
//! them mid-week.
//!
//!   1. Issue a frequent, private pass for C7 (approved, no approval step)
//!   2. Day 1: admitted
//!   3. Management revokes the pass; day 2 scan is denied as revoked even
//!      though the window is still open
//!   4. A pass with one character altered is denied as invalid
//!   5. The C7 pass resealed under B2's key is denied as invalid, even though
//!      the gate holds that key
//!   6. A C7 pass sealed by another community is denied as invalid

use gatepass_cipher::CredentialKey;
use gatepass_contracts::{
    error::GatepassResult,
    token::Token,
    visit::{ApartmentId, ApprovalType, GuestType, IssueRequest, ValidityBound},
};

use crate::{
    mock_data::{gate_time, issued_at, scenario_day, MANAGEMENT},
    scenarios::{print_audit_summary, print_scan, Community, Scan},
};

/// Change one character near the middle of the token text.
fn alter_one_char(token: &Token) -> Token {
    let mut chars: Vec<char> = token.as_str().chars().collect();
    let mid = chars.len() / 2;
    if let Some(c) = chars.get_mut(mid) {
        *c = if *c == 'x' { 'y' } else { 'x' };
    }
    Token::new(chars.into_iter().collect::<String>())
}

/// Issue, admit, revoke, and try the forgeries.
pub fn scans(community: &Community) -> GatepassResult<Vec<Scan>> {
    let key = community.key_for("C7");
    let (contractor, token) = community.issuer.issue(
        IssueRequest {
            apartment_id: ApartmentId::new("C7"),
            guest_type: GuestType::Frequent,
            approval_type: ApprovalType::Private,
            valid_from: ValidityBound::on(scenario_day(0)),
            valid_to: Some(ValidityBound::on(scenario_day(4))),
        },
        key,
        issued_at(),
    )?;

    let mut scans = vec![community.scan("contractor, day 1", &token, gate_time(1, 9, 0))];

    community.lifecycle.revoke(&contractor.guest_id, MANAGEMENT)?;

    let under_b2_key = community
        .issuer
        .reissue(&contractor.guest_id, community.key_for("B2"))?;
    let from_elsewhere = community
        .issuer
        .reissue(&contractor.guest_id, &CredentialKey::generate())?;

    scans.extend([
        community.scan("contractor, day 2 after revocation", &token, gate_time(2, 9, 0)),
        community.scan("altered pass", &alter_one_char(&token), gate_time(2, 9, 5)),
        community.scan("pass under B2's key", &under_b2_key, gate_time(2, 9, 10)),
        community.scan("pass from another community", &from_elsewhere, gate_time(2, 9, 15)),
    ]);

    Ok(scans)
}

/// Run Scenario 3: Revocation and Forged Passes.
pub fn run_scenario() -> GatepassResult<()> {
    println!("=== Scenario 3: Revocation and Forged Passes ===");
    println!();
    println!("  Apartment:  C7");
    println!("  Pass:       frequent, private, {}..={}", scenario_day(0), scenario_day(4));
    println!();

    let community = Community::maple_court()?;
    for scan in scans(&community)? {
        print_scan(&scan);
    }

    print_audit_summary(&community)?;
    println!();
    println!("  Scenario 3 complete.");
    println!();

    Ok(())
}
