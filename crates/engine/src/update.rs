//! Partial update boundary
//!
//! Incoming update payloads are open-ended field maps; this module closes
//! them down to the fixed allow-list before anything reaches the store.
//! Unknown field names and wrongly-typed values are silently dropped - the
//! allow-list is a protective boundary, not a completeness guarantee. The
//! one exception is the canonical end instant: a caller explicitly asking to
//! set it with an unparseable value is corrected, not ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracklog_core::error::{Error, Result};
use tracklog_core::reconcile::ParseError;
use tracklog_core::types::{FieldUpdate, RecordKey, UpdatePatch};

/// A request to update one record by full primary key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Full primary key of the record
    #[serde(flatten)]
    pub key: RecordKey,
    /// Open-ended field map; only allow-listed entries take effect
    pub fields: Map<String, Value>,
}

/// Build an [`UpdatePatch`] from an open-ended field map.
///
/// # Errors
///
/// `Error::NothingToUpdate` when no allow-listed field survives;
/// `Error::Unreconcilable` for an `endInstant` that is not a valid instant.
pub(crate) fn patch_from_fields(fields: &Map<String, Value>) -> Result<UpdatePatch> {
    let mut patch = UpdatePatch::new();
    for (name, value) in fields {
        match name.as_str() {
            "displayName" => push_string(&mut patch, value, FieldUpdate::DisplayName),
            "startTime" => push_string(&mut patch, value, FieldUpdate::RawStartTime),
            "endTime" => push_string(&mut patch, value, FieldUpdate::RawEndTime),
            "date" => push_string(&mut patch, value, FieldUpdate::CalendarDate),
            "text" => push_string(&mut patch, value, FieldUpdate::Text),
            "endInstant" => patch.push(FieldUpdate::CanonicalEnd(parse_instant(value)?)),
            // Everything else, keys included, never reaches the store
            _ => {}
        }
    }
    if patch.is_empty() {
        return Err(Error::NothingToUpdate);
    }
    Ok(patch)
}

fn push_string(patch: &mut UpdatePatch, value: &Value, make: fn(String) -> FieldUpdate) {
    if let Some(s) = value.as_str() {
        patch.push(make(s.to_string()));
    }
}

fn parse_instant(value: &Value) -> Result<DateTime<Utc>> {
    let raw = value.as_str().unwrap_or_default();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::Unreconcilable(ParseError::BadInstant(raw.to_string())))
}
