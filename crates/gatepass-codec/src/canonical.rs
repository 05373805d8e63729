//! Canonical record encoding.
//!
//! Every field is written explicitly, in a fixed order, with fixed widths or
//! a length prefix, so equal records always produce identical bytes.
//!
//! Layout, version 1 (integers little-endian):
//!   1. version               u8 (= 1)
//!   2. guest_id              16 raw UUID bytes
//!   3. apartment_id          u16 byte length, then UTF-8 bytes
//!   4. guest_type            u8 (0 one_time, 1 frequent)
//!   5. approval_type         u8 (0 preapproved, 1 private, 2 needs_approval)
//!   6. valid_from            bound (see below)
//!   7. valid_to              bound
//!   8. issued_at             i64 unix seconds, u32 subsecond nanos
//!   9. nonce                 16 raw bytes
//!
//! A bound is an i32 day count from CE, a u8 time flag (0 or 1) and, when
//! the flag is 1, u32 seconds from midnight followed by u32 nanos.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc};

use gatepass_contracts::{
    error::{DecodeError, GatepassError, GatepassResult},
    visit::{
        ApartmentId, ApprovalType, GuestId, GuestType, ValidityBound, VisitRecord, VISIT_NONCE_LEN,
    },
};

/// The format version this build writes and reads.
pub const FORMAT_VERSION: u8 = 1;

const GUEST_ID_LEN: usize = 16;

/// Encode `record` into its canonical byte form.
///
/// Records are validated first; a record that breaks a `VisitRecord`
/// invariant (for example an apartment ID longer than the length prefix can
/// express) is refused with `GatepassError::InvalidRequest` rather than
/// encoded lossily.
pub fn encode(record: &VisitRecord) -> GatepassResult<Vec<u8>> {
    record.validate()?;

    let apartment = record.apartment_id.as_str().as_bytes();
    let apartment_len = u16::try_from(apartment.len()).map_err(|_| GatepassError::InvalidRequest {
        reason: format!("apartment_id is {} bytes, too long to encode", apartment.len()),
    })?;

    let mut out = Vec::with_capacity(96 + apartment.len());
    out.push(FORMAT_VERSION);
    out.extend_from_slice(record.guest_id.0.as_bytes());
    out.extend_from_slice(&apartment_len.to_le_bytes());
    out.extend_from_slice(apartment);
    out.push(guest_type_tag(record.guest_type));
    out.push(approval_type_tag(record.approval_type));
    write_bound(&mut out, &record.valid_from);
    write_bound(&mut out, &record.valid_to);
    out.extend_from_slice(&record.issued_at.timestamp().to_le_bytes());
    out.extend_from_slice(&record.issued_at.timestamp_subsec_nanos().to_le_bytes());
    out.extend_from_slice(&record.nonce);
    Ok(out)
}

/// Decode canonical bytes back into a `VisitRecord`.
///
/// Fails with `DecodeError::UnknownVersion` when the leading byte is not a
/// supported version, and `DecodeError::Malformed` for anything else that
/// is wrong: truncation, trailing bytes, unknown enum tags, invalid UTF-8,
/// out-of-range dates, or a record that breaks its own invariants.
pub fn decode(bytes: &[u8]) -> Result<VisitRecord, DecodeError> {
    let mut reader = Reader::new(bytes);

    let version = reader.u8("version")?;
    if version != FORMAT_VERSION {
        return Err(DecodeError::UnknownVersion { version });
    }

    let guest_id = GuestId(uuid::Uuid::from_bytes(reader.array::<GUEST_ID_LEN>("guest_id")?));

    let apartment_len = reader.u16("apartment_id length")? as usize;
    let apartment_bytes = reader.take(apartment_len, "apartment_id")?;
    let apartment_id = std::str::from_utf8(apartment_bytes)
        .map_err(|_| malformed("apartment_id is not valid UTF-8"))?;

    let guest_type = match reader.u8("guest_type")? {
        0 => GuestType::OneTime,
        1 => GuestType::Frequent,
        tag => return Err(malformed(format!("unknown guest_type tag {tag}"))),
    };
    let approval_type = match reader.u8("approval_type")? {
        0 => ApprovalType::Preapproved,
        1 => ApprovalType::Private,
        2 => ApprovalType::NeedsApproval,
        tag => return Err(malformed(format!("unknown approval_type tag {tag}"))),
    };

    let valid_from = read_bound(&mut reader, "valid_from")?;
    let valid_to = read_bound(&mut reader, "valid_to")?;

    let issued_secs = reader.i64("issued_at seconds")?;
    let issued_nanos = reader.u32("issued_at nanos")?;
    let issued_at = DateTime::<Utc>::from_timestamp(issued_secs, issued_nanos)
        .ok_or_else(|| malformed("issued_at is out of range"))?;

    let nonce = reader.array::<VISIT_NONCE_LEN>("nonce")?;
    reader.finish()?;

    let record = VisitRecord {
        guest_id,
        apartment_id: ApartmentId::new(apartment_id),
        guest_type,
        approval_type,
        valid_from,
        valid_to,
        issued_at,
        nonce,
    };
    record
        .validate()
        .map_err(|e| malformed(format!("record invariant violated: {e}")))?;
    Ok(record)
}

// ── Field helpers ─────────────────────────────────────────────────────────────

fn guest_type_tag(guest_type: GuestType) -> u8 {
    match guest_type {
        GuestType::OneTime => 0,
        GuestType::Frequent => 1,
    }
}

fn approval_type_tag(approval_type: ApprovalType) -> u8 {
    match approval_type {
        ApprovalType::Preapproved => 0,
        ApprovalType::Private => 1,
        ApprovalType::NeedsApproval => 2,
    }
}

fn write_bound(out: &mut Vec<u8>, bound: &ValidityBound) {
    out.extend_from_slice(&bound.date.num_days_from_ce().to_le_bytes());
    match bound.time {
        None => out.push(0),
        Some(time) => {
            out.push(1);
            out.extend_from_slice(&time.num_seconds_from_midnight().to_le_bytes());
            out.extend_from_slice(&time.nanosecond().to_le_bytes());
        }
    }
}

fn read_bound(reader: &mut Reader<'_>, field: &'static str) -> Result<ValidityBound, DecodeError> {
    let days = reader.i32(field)?;
    let date = NaiveDate::from_num_days_from_ce_opt(days)
        .ok_or_else(|| malformed(format!("{field} date is out of range")))?;

    let time = match reader.u8(field)? {
        0 => None,
        1 => {
            let secs = reader.u32(field)?;
            let nanos = reader.u32(field)?;
            let time = NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
                .ok_or_else(|| malformed(format!("{field} time is out of range")))?;
            Some(time)
        }
        flag => return Err(malformed(format!("{field} has invalid time flag {flag}"))),
    };

    Ok(ValidityBound { date, time })
}

fn malformed(reason: impl Into<String>) -> DecodeError {
    DecodeError::Malformed {
        reason: reason.into(),
    }
}

// ── Reader ────────────────────────────────────────────────────────────────────

/// Bounds-checked cursor over the input bytes.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize, field: &str) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| malformed(format!("truncated input while reading {field}")))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, field: &str) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, field)?);
        Ok(out)
    }

    fn u8(&mut self, field: &str) -> Result<u8, DecodeError> {
        Ok(self.array::<1>(field)?[0])
    }

    fn u16(&mut self, field: &str) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.array(field)?))
    }

    fn u32(&mut self, field: &str) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.array(field)?))
    }

    fn i32(&mut self, field: &str) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.array(field)?))
    }

    fn i64(&mut self, field: &str) -> Result<i64, DecodeError> {
        Ok(i64::from_le_bytes(self.array(field)?))
    }

    fn finish(self) -> Result<(), DecodeError> {
        if self.pos == self.bytes.len() {
            Ok(())
        } else {
            Err(malformed(format!(
                "{} trailing byte(s) after record",
                self.bytes.len() - self.pos
            )))
        }
    }
}
