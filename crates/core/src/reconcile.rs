//! Timestamp reconciliation
//!
//! Normalizes heterogeneous date/time input into canonical UTC instants and
//! computes display durations.
//!
//! ## Design
//!
//! 1. **Permissive parsing**: input comes from hand-typed entry fields.
//!    24-hour `HH:MM[:SS]`, 12-hour with an `AM`/`PM` designator, and
//!    fully-qualified instants are all accepted. A designator on an hour
//!    already in 24-hour range (`13:00 PM`) is preserved as-is rather than
//!    rejected.
//! 2. **Wall clock is UTC**: locally-entered wall-clock values are combined
//!    with the calendar date and interpreted as UTC wall-clock values. This
//!    is a known simplification, not a timezone-aware conversion; the rest
//!    of the ordering and query logic depends on it, so it must not be
//!    "fixed" in isolation.
//! 3. **Cross-midnight rollover**: an end instant chronologically before its
//!    start is assumed to belong to the next day and is moved forward by
//!    exactly 24 hours.
//! 4. **No fabrication**: unrecognized input fails reconciliation. Callers
//!    keep the raw strings and treat the record as having no canonical
//!    duration.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use thiserror::Error;

/// Reconciliation failures
///
/// Each variant carries the offending input verbatim so callers can surface
/// it in a correct-your-input message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Calendar date matched no recognized pattern
    #[error("unrecognized calendar date: {0:?}")]
    BadDate(String),

    /// Time-of-day string matched no recognized pattern
    #[error("unrecognized time of day: {0:?}")]
    BadTime(String),

    /// A fully-qualified instant string failed to parse
    #[error("unrecognized instant: {0:?}")]
    BadInstant(String),
}

/// Canonical start and (optional) end instants for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciled {
    /// Canonical UTC start instant
    pub start: DateTime<Utc>,
    /// Canonical UTC end instant, rolled past midnight when needed.
    /// `None` when no end time was supplied or it failed to reconcile.
    pub end: Option<DateTime<Utc>>,
}

/// Reconcile one record's raw date/time strings.
///
/// The start instant is required: without it there is no sort key, so a
/// failed start reconciliation is an error. A failed *end* reconciliation is
/// not: the record is still storable with its raw strings, it just has no
/// canonical duration.
pub fn reconcile(
    calendar_date: &str,
    raw_start: &str,
    raw_end: Option<&str>,
) -> Result<Reconciled, ParseError> {
    let start = canonical_instant(calendar_date, raw_start)?;
    let end = raw_end
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .and_then(|e| canonical_instant(calendar_date, e).ok())
        .map(|end| roll_forward(start, end));
    Ok(Reconciled { start, end })
}

/// Combine a calendar date and a time-of-day string into a UTC instant.
///
/// A time string that already looks like a fully-qualified instant
/// (`YYYY-MM-DDT...`) is parsed directly and the calendar date is ignored.
pub fn canonical_instant(
    calendar_date: &str,
    raw_time: &str,
) -> Result<DateTime<Utc>, ParseError> {
    let raw_time = raw_time.trim();
    if looks_like_instant(raw_time) {
        return DateTime::parse_from_rfc3339(raw_time)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| ParseError::BadInstant(raw_time.to_string()));
    }

    let normalized = calendar_date.trim().replace('/', "-");
    let date = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .map_err(|_| ParseError::BadDate(calendar_date.to_string()))?;
    let time = parse_wall_clock(raw_time)?;
    Ok(Utc.from_utc_datetime(&date.and_time(time)))
}

/// Move an end instant forward by 24 hours when it precedes its start.
///
/// An activity whose end clock time is numerically earlier than its start
/// crossed midnight; both were entered against the same calendar date.
pub fn roll_forward(start: DateTime<Utc>, end: DateTime<Utc>) -> DateTime<Utc> {
    if end < start {
        end + Duration::hours(24)
    } else {
        end
    }
}

/// Duration between two instants in whole minutes, rounded
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let seconds = (end - start).num_seconds();
    (seconds + 30).div_euclid(60)
}

/// Format a minute count for display: `{h}h {m}m` when hours > 0, else `{m}m`
pub fn format_duration(minutes: i64) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    if hours > 0 {
        format!("{hours}h {rest}m")
    } else {
        format!("{rest}m")
    }
}

/// Cheap structural check for `YYYY-MM-DDT...` before attempting a full parse
fn looks_like_instant(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() > 10
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[4] == b'-'
        && b[5..7].iter().all(u8::is_ascii_digit)
        && b[7] == b'-'
        && b[8..10].iter().all(u8::is_ascii_digit)
        && b[10] == b'T'
}

/// Parse `HH:MM[:SS]` with an optional case-insensitive AM/PM designator.
///
/// 12-hour conversion: 12 AM -> 0, 12 PM stays 12, PM adds 12 to hours 1-11.
/// An out-of-range designator combination (`13:00 PM`) passes through
/// unvalidated; the hour is already unambiguous.
fn parse_wall_clock(raw: &str) -> Result<NaiveTime, ParseError> {
    let bad = || ParseError::BadTime(raw.to_string());

    let upper = raw.to_ascii_uppercase();
    let (clock, meridiem) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim_end().to_string(), Some(Meridiem::Am))
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim_end().to_string(), Some(Meridiem::Pm))
    } else {
        (upper, None)
    };

    let parts: Vec<&str> = clock.trim().split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(bad());
    }
    let mut hour: u32 = parts[0].parse().map_err(|_| bad())?;
    let minute: u32 = parts[1].parse().map_err(|_| bad())?;
    let second: u32 = match parts.get(2) {
        Some(s) => s.parse().map_err(|_| bad())?,
        None => 0,
    };

    match meridiem {
        Some(Meridiem::Pm) if hour < 12 => hour += 12,
        Some(Meridiem::Am) if hour == 12 => hour = 0,
        _ => {}
    }

    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(bad)
}

#[derive(Clone, Copy)]
enum Meridiem {
    Am,
    Pm,
}
