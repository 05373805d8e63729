//! Visit record types.
//!
//! A `VisitRecord` is the immutable fact a guest credential carries: who may
//! enter, on whose behalf, and when. Everything the gate needs to decide
//! admission, apart from the mutable lifecycle status, lives here.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GatepassError, GatepassResult};

/// Length in bytes of the per-issuance random nonce.
pub const VISIT_NONCE_LEN: usize = 16;

/// Longest apartment identifier the credential format can carry.
pub const MAX_APARTMENT_ID_LEN: usize = u16::MAX as usize;

/// Opaque, unique identifier for one guest visit.
///
/// Assigned at issuance and never changed. Lifecycle state, audit records
/// and store entries are all keyed by this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuestId(pub uuid::Uuid);

impl GuestId {
    /// Create a new, random guest ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for GuestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of the apartment (unit) granting access.
///
/// Example: ApartmentId("A1")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApartmentId(pub String);

impl ApartmentId {
    /// Wrap an apartment id. Blank ids are rejected when the visit is
    /// validated, not here.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How often the guest is expected to visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestType {
    /// A single visit on one day. `valid_to` defaults to the end of that day.
    OneTime,
    /// Repeated visits over a date range. `valid_to` must be given explicitly.
    Frequent,
}

/// How the resident vouched for the guest at issuance.
///
/// Decides the initial lifecycle status: only `NeedsApproval` visits wait
/// for an approver before the credential can admit anyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalType {
    Preapproved,
    Private,
    NeedsApproval,
}

impl ApprovalType {
    /// True if visits of this type start in `pending_approval`.
    pub fn requires_approval(self) -> bool {
        matches!(self, ApprovalType::NeedsApproval)
    }
}

/// One end of a validity window: a calendar date with an optional time of day.
///
/// Without a time the bound covers the whole day, so a `valid_from` bound
/// opens at the start of its day and a `valid_to` bound closes at the very
/// end of its day. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidityBound {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
}

impl ValidityBound {
    /// A whole-day bound.
    pub fn on(date: NaiveDate) -> Self {
        Self { date, time: None }
    }

    /// A bound at a specific time of day.
    pub fn at(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time: Some(time) }
    }

    /// True if `now` is earlier than this bound read as a window start.
    pub fn opens_after(&self, now: NaiveDateTime) -> bool {
        match self.time {
            Some(time) => now < self.date.and_time(time),
            None => now.date() < self.date,
        }
    }

    /// True if `now` is later than this bound read as a window end.
    pub fn closes_before(&self, now: NaiveDateTime) -> bool {
        match self.time {
            Some(time) => now > self.date.and_time(time),
            None => now.date() > self.date,
        }
    }
}

impl fmt::Display for ValidityBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.time {
            Some(time) => write!(f, "{} {}", self.date, time),
            None => write!(f, "{}", self.date),
        }
    }
}

/// Where a point in time falls relative to a visit's validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPosition {
    NotYetValid,
    Within,
    Elapsed,
}

/// The immutable record a guest credential encodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub guest_id: GuestId,
    pub apartment_id: ApartmentId,
    pub guest_type: GuestType,
    pub approval_type: ApprovalType,
    pub valid_from: ValidityBound,
    pub valid_to: ValidityBound,
    /// When the credential was issued (UTC).
    pub issued_at: DateTime<Utc>,
    /// Random per issuance; two issuances never share a nonce.
    pub nonce: [u8; VISIT_NONCE_LEN],
}

/// What a resident asks for when registering a guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRequest {
    pub apartment_id: ApartmentId,
    pub guest_type: GuestType,
    pub approval_type: ApprovalType,
    pub valid_from: ValidityBound,
    /// Required for frequent guests. One-time guests default to the end of
    /// the `valid_from` day.
    #[serde(default)]
    pub valid_to: Option<ValidityBound>,
}

impl VisitRecord {
    /// Build a new record from `request`, assigning a fresh guest ID and nonce.
    ///
    /// Returns `GatepassError::InvalidRequest` if the apartment ID is empty
    /// or too long, a frequent guest has no `valid_to`, or the window closes
    /// before it opens.
    pub fn issue(request: IssueRequest, issued_at: DateTime<Utc>) -> GatepassResult<Self> {
        let valid_to = match (request.guest_type, request.valid_to) {
            (_, Some(bound)) => bound,
            (GuestType::OneTime, None) => ValidityBound::on(request.valid_from.date),
            (GuestType::Frequent, None) => {
                return Err(GatepassError::InvalidRequest {
                    reason: "frequent guests require an explicit valid_to".to_string(),
                })
            }
        };

        let record = Self {
            guest_id: GuestId::new(),
            apartment_id: request.apartment_id,
            guest_type: request.guest_type,
            approval_type: request.approval_type,
            valid_from: request.valid_from,
            valid_to,
            issued_at,
            nonce: rand::random(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Check the invariants every well-formed record satisfies.
    pub fn validate(&self) -> GatepassResult<()> {
        if self.apartment_id.0.trim().is_empty() {
            return Err(GatepassError::InvalidRequest {
                reason: "apartment_id is required".to_string(),
            });
        }
        if self.apartment_id.0.len() > MAX_APARTMENT_ID_LEN {
            return Err(GatepassError::InvalidRequest {
                reason: format!(
                    "apartment_id is {} bytes, limit is {}",
                    self.apartment_id.0.len(),
                    MAX_APARTMENT_ID_LEN
                ),
            });
        }
        if !self.window_is_open_somewhere() {
            return Err(GatepassError::InvalidRequest {
                reason: format!(
                    "valid_to ({}) is before valid_from ({})",
                    self.valid_to, self.valid_from
                ),
            });
        }
        Ok(())
    }

    /// Locate `now` relative to `[valid_from, valid_to]`.
    pub fn window_position(&self, now: NaiveDateTime) -> WindowPosition {
        if self.valid_from.opens_after(now) {
            WindowPosition::NotYetValid
        } else if self.valid_to.closes_before(now) {
            WindowPosition::Elapsed
        } else {
            WindowPosition::Within
        }
    }

    fn window_is_open_somewhere(&self) -> bool {
        use std::cmp::Ordering;

        match self.valid_to.date.cmp(&self.valid_from.date) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => match (self.valid_from.time, self.valid_to.time) {
                (Some(from), Some(to)) => from <= to,
                _ => true,
            },
        }
    }
}
