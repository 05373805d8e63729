//! Scenario 1: Preapproved One-Time Guest
//!
//! A resident of A1 expects a friend on day 0 and preapproves the visit.
//!
//!   1. Issue a one_time, preapproved pass for day 0 (state: approved)
//!   2. Day 0, 09:30: first scan admits and activates the visit
//!   3. Day 0, 17:45: the guest leaves and returns; re-scan admits
//!   4. Day 1, 08:00: the window has closed; denied, visit expires
//!   5. Audit ledger shows create, activate, expire and verifies

use gatepass_contracts::{
    error::GatepassResult,
    visit::{ApartmentId, ApprovalType, GuestType, IssueRequest, ValidityBound},
};

use crate::{
    mock_data::{gate_time, issued_at, scenario_day},
    scenarios::{print_audit_summary, print_scan, Community, Scan},
};

/// Issue the pass and scan it three times.
pub fn scans(community: &Community) -> GatepassResult<Vec<Scan>> {
    let request = IssueRequest {
        apartment_id: ApartmentId::new("A1"),
        guest_type: GuestType::OneTime,
        approval_type: ApprovalType::Preapproved,
        valid_from: ValidityBound::on(scenario_day(0)),
        valid_to: None,
    };
    let key = community.key_for("A1");
    let (_, token) = community.issuer.issue(request, key, issued_at())?;

    let scan = |label: &str, now| community.scan(label, &token, now);

    Ok(vec![
        scan("day 0 09:30 arrival", gate_time(0, 9, 30)),
        scan("day 0 17:45 return", gate_time(0, 17, 45)),
        scan("day 1 08:00 next morning", gate_time(1, 8, 0)),
    ])
}

/// Run Scenario 1: Preapproved One-Time Guest.
pub fn run_scenario() -> GatepassResult<()> {
    println!("=== Scenario 1: Preapproved One-Time Guest ===");
    println!();
    println!("  Apartment:  A1");
    println!("  Pass:       one_time, preapproved, valid {}", scenario_day(0));
    println!();

    let community = Community::maple_court()?;
    for scan in scans(&community)? {
        print_scan(&scan);
    }

    print_audit_summary(&community)?;
    println!();
    println!("  Scenario 1 complete.");
    println!();

    Ok(())
}
