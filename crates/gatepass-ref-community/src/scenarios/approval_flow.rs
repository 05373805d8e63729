//! Scenario 2: Frequent Guest Awaiting Approval
//!
//! A cleaner registers for weekly access to B2 and a courier registers for a
//! single delivery to A4. Both need the resident's approval.
//!
//!   1. Issue a frequent pass for B2 covering days 0..=6 (pending)
//!   2. Scan before approval: denied, pending approval
//!   3. The B2 resident approves; scans on days 0 and 6 admit
//!   4. The courier's one_time request for A4 is denied by its resident
//!   5. Re-approving the B2 pass is rejected as an illegal transition
//!
//! B2 has its own key in the community config, so the B2 pass is sealed and
//! opened with a different key from the A4 pass.

use gatepass_contracts::{
    error::{GatepassError, GatepassResult, TransitionError},
    visit::{ApartmentId, ApprovalType, GuestType, IssueRequest, ValidityBound},
};

use crate::{
    mock_data::{gate_time, issued_at, resident_for, scenario_day},
    scenarios::{print_audit_summary, print_scan, Community, Scan},
};

fn resident(apartment: &str) -> GatepassResult<&'static str> {
    resident_for(apartment).ok_or_else(|| GatepassError::ConfigError {
        reason: format!("no resident on record for apartment {apartment}"),
    })
}

/// Walk both requests through approval.
///
/// Returns every gate scan and the error that refused the second approval
/// of the cleaner's pass. Fails if that second approval is accepted.
pub fn scans(community: &Community) -> GatepassResult<(Vec<Scan>, TransitionError)> {
    let cleaner_key = community.key_for("B2");
    let (cleaner, cleaner_token) = community.issuer.issue(
        IssueRequest {
            apartment_id: ApartmentId::new("B2"),
            guest_type: GuestType::Frequent,
            approval_type: ApprovalType::NeedsApproval,
            valid_from: ValidityBound::on(scenario_day(0)),
            valid_to: Some(ValidityBound::on(scenario_day(6))),
        },
        cleaner_key,
        issued_at(),
    )?;

    let courier_key = community.key_for("A4");
    let (courier, courier_token) = community.issuer.issue(
        IssueRequest {
            apartment_id: ApartmentId::new("A4"),
            guest_type: GuestType::OneTime,
            approval_type: ApprovalType::NeedsApproval,
            valid_from: ValidityBound::on(scenario_day(2)),
            valid_to: None,
        },
        courier_key,
        issued_at(),
    )?;

    let mut scans = vec![community.scan(
        "cleaner, before approval",
        &cleaner_token,
        gate_time(0, 8, 0),
    )];

    community.lifecycle.approve(&cleaner.guest_id, resident("B2")?)?;
    community
        .lifecycle
        .deny(&courier.guest_id, resident("A4")?, "not expecting a delivery")?;

    for (label, now) in [
        ("cleaner, day 0 10:00", gate_time(0, 10, 0)),
        ("cleaner, day 6 23:30", gate_time(6, 23, 30)),
    ] {
        scans.push(community.scan(label, &cleaner_token, now));
    }
    scans.push(community.scan("courier, day 2 14:00", &courier_token, gate_time(2, 14, 0)));

    let rejection = match community.lifecycle.approve(&cleaner.guest_id, resident("B2")?) {
        Err(GatepassError::Transition(e)) => e,
        Err(e) => return Err(e),
        Ok(state) => {
            return Err(GatepassError::InvalidRequest {
                reason: format!(
                    "second approval of guest {} was accepted at version {}",
                    state.guest_id(),
                    state.version
                ),
            })
        }
    };

    Ok((scans, rejection))
}

/// Run Scenario 2: Frequent Guest Awaiting Approval.
pub fn run_scenario() -> GatepassResult<()> {
    println!("=== Scenario 2: Frequent Guest Awaiting Approval ===");
    println!();
    println!("  Cleaner:  B2, frequent, needs approval, {}..={}", scenario_day(0), scenario_day(6));
    println!("  Courier:  A4, one_time, needs approval, {}", scenario_day(2));
    println!();

    let community = Community::maple_court()?;
    let (scans, rejection) = scans(&community)?;
    for scan in &scans {
        print_scan(scan);
    }
    println!();
    println!("  Second approval of the cleaner's pass:  {}", rejection);

    print_audit_summary(&community)?;
    println!();
    println!("  Scenario 2 complete.");
    println!();

    Ok(())
}
