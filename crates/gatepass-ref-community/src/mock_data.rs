//! Simulated residents and calendar for the reference community.
//!
//! All names and dates are fictional. Scenario times are fixed rather than
//! read from the clock so every run prints the same decisions.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

// ── Residents (mock) ──────────────────────────────────────────────────────────

/// (apartment, resident) pairs for Maple Court.
pub const RESIDENTS: &[(&str, &str)] = &[
    ("A1", "resident-priya"),
    ("A4", "resident-tomas"),
    ("B2", "resident-oyelaran"),
    ("C7", "resident-lindqvist"),
];

/// The community management office, which may revoke any pass.
pub const MANAGEMENT: &str = "management-office";

/// The resident who answers approval requests for `apartment`.
pub fn resident_for(apartment: &str) -> Option<&'static str> {
    RESIDENTS
        .iter()
        .find(|(id, _)| *id == apartment)
        .map(|(_, resident)| *resident)
}

// ── Calendar (mock) ───────────────────────────────────────────────────────────

/// The first day of the scenario week.
pub fn scenario_day(offset: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 9)
        .and_then(|d| d.checked_add_days(chrono::Days::new(u64::from(offset))))
        .unwrap_or(NaiveDate::MIN)
}

/// Local gate time on scenario day `offset`.
pub fn gate_time(offset: u32, hour: u32, minute: u32) -> NaiveDateTime {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    scenario_day(offset).and_time(time)
}

/// Issuance instant: 07:00 UTC on the morning before the scenario week.
pub fn issued_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 8, 7, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
