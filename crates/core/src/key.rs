//! Key scheme for log records
//!
//! Three independent keys are derived for every record:
//!
//! - **Stream id**: case-folded, stripped to `[a-z0-9]`. Pure and idempotent.
//!   Distinct display names may collide after folding ("MIT 6.S081" and
//!   "mit 6 s081" both map to `mit6s081`); this is an accepted property.
//! - **Partition key**: `LOG#<n>` with `n` drawn uniformly at random at write
//!   time. Spreads writes across partitions; carries no semantic meaning and
//!   must never be used for filtering or derived from stream/time.
//! - **Sort key**: `TIME#` + the canonical UTC start instant in fixed-width
//!   ISO-8601, so plain lexicographic comparison equals chronological order.

use crate::limits::Limits;
use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;

/// Prefix of every sort key
pub const SORT_KEY_PREFIX: &str = "TIME#";

/// Prefix of every write-shard partition key
pub const PARTITION_PREFIX: &str = "LOG#";

/// Fixed-width instant format used inside sort keys.
/// Second resolution with a trailing `Z`; all fields zero-padded.
pub const SORT_KEY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Derive the stable stream identifier from a display name.
///
/// Case-folds, then strips every character outside `[a-z0-9]`.
///
/// # Examples
///
/// ```
/// use tracklog_core::key::stream_id;
///
/// assert_eq!(stream_id("MIT 6.S081"), "mit6s081");
/// assert_eq!(stream_id("mit 6 s081"), "mit6s081");
/// ```
pub fn stream_id(display_name: &str) -> String {
    display_name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Draw a write shard uniformly at random.
///
/// Called once per write, never recomputed or looked up afterwards. A retried
/// write is permitted to land on a different shard than its failed predecessor.
pub fn draw_shard<R: Rng + ?Sized>(rng: &mut R, limits: &Limits) -> u8 {
    rng.gen_range(0..limits.shard_count)
}

/// Render the partition key for a shard: `LOG#<n>`
pub fn partition_key(shard: u8) -> String {
    format!("{PARTITION_PREFIX}{shard}")
}

/// Render the time-ordered sort key for a canonical start instant.
pub fn sort_key(canonical_start: DateTime<Utc>) -> String {
    format!(
        "{SORT_KEY_PREFIX}{}",
        canonical_start.format(SORT_KEY_TIME_FORMAT)
    )
}

/// Inclusive sort-key bounds covering one UTC calendar day.
///
/// Accepts `YYYY-MM-DD` with `-` or `/` separators and unpadded fields.
/// Returns `None` when the string is not a recognizable date; callers fall
/// back to an unfiltered query rather than erroring.
pub fn day_bounds(calendar_date: &str) -> Option<(String, String)> {
    let normalized = calendar_date.trim().replace('/', "-");
    let day = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").ok()?;
    // Re-format so unpadded input ("2024-3-5") still matches the
    // zero-padded sort keys.
    let day = day.format("%Y-%m-%d");
    Some((
        format!("{SORT_KEY_PREFIX}{day}T00:00:00Z"),
        format!("{SORT_KEY_PREFIX}{day}T23:59:59Z"),
    ))
}
