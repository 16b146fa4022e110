//! Record types shared across the system
//!
//! Two entity kinds share one physical store: log records and stream-registry
//! records. At the application layer they form a proper tagged union
//! ([`Record`]); the stored `recordType` string is a serialization detail
//! that the store checks as a conditional guard, never something callers
//! branch on at run time.

use crate::key;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminator stored with every row.
///
/// Never changes after creation; enforced as a guard condition on update
/// and delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    /// A user activity log record
    #[serde(rename = "LOG")]
    Log,
    /// A stream-registry record
    #[serde(rename = "STREAM")]
    Stream,
}

/// Full primary key of a stored row: write-shard partition plus
/// time-ordered sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    /// Partition key, e.g. `LOG#4`
    #[serde(rename = "partitionKey")]
    pub partition_key: String,
    /// Sort key, e.g. `TIME#2024-03-15T09:00:00Z`
    #[serde(rename = "sortKey")]
    pub sort_key: String,
}

/// One user activity entry.
///
/// `stream_id`, `shard_key`, `sort_key` and the record kind are fixed at
/// write time; only display fields may change afterwards (see
/// [`UpdatePatch`]). The raw user-entered strings are retained verbatim even
/// after canonicalization, because later edits compare against them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// Unique id assigned at write time
    pub record_id: Uuid,
    /// Stable identifier derived from the display name (collisions across
    /// folded display-name variants are accepted)
    pub stream_id: String,
    /// Random write shard in `0..shard_count`; never used for filtering
    pub shard_key: u8,
    /// Lexicographically time-ordered sort key
    pub sort_key: String,
    /// Original, unnormalized stream name
    pub display_name: String,
    /// Raw user-entered calendar date
    pub calendar_date: String,
    /// Raw user-entered start time
    pub raw_start_time: String,
    /// Raw user-entered end time, if any
    pub raw_end_time: Option<String>,
    /// Canonical UTC start instant
    pub canonical_start: DateTime<Utc>,
    /// Canonical UTC end instant; `None` until reconciled.
    /// Always >= `canonical_start` when present.
    pub canonical_end: Option<DateTime<Utc>>,
    /// Free-form note, may be empty
    pub text: String,
}

impl LogRecord {
    /// Full primary key of this record
    pub fn key(&self) -> RecordKey {
        RecordKey {
            partition_key: key::partition_key(self.shard_key),
            sort_key: self.sort_key.clone(),
        }
    }
}

/// A stream-registry entry: one named activity category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRecord {
    /// Unique key, derived from the display name
    pub stream_id: String,
    /// Original display name
    pub display_name: String,
    /// Registration instant
    pub created_at: DateTime<Utc>,
}

/// Tagged union over everything sharing the physical store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "recordType")]
pub enum Record {
    /// A user activity log record
    #[serde(rename = "LOG")]
    Log(LogRecord),
    /// A stream-registry record
    #[serde(rename = "STREAM")]
    Stream(StreamRecord),
}

impl Record {
    /// The stored discriminator of this row
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Log(_) => RecordKind::Log,
            Record::Stream(_) => RecordKind::Stream,
        }
    }
}

/// One allow-listed field update.
///
/// A closed, explicitly enumerated set: anything outside it never reaches
/// the store. Key fields (`stream_id`, `shard_key`, `sort_key`,
/// `canonical_start`) are deliberately absent - they are immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldUpdate {
    /// Replace the display name
    DisplayName(String),
    /// Replace the raw start-time string (display only; the sort key is
    /// fixed at write time)
    RawStartTime(String),
    /// Replace the raw end-time string
    RawEndTime(String),
    /// Replace the raw calendar date
    CalendarDate(String),
    /// Replace the free-form note
    Text(String),
    /// Replace the canonical end instant
    CanonicalEnd(DateTime<Utc>),
}

/// A sparse update built purely from allow-listed fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePatch {
    fields: Vec<FieldUpdate>,
}

impl UpdatePatch {
    /// Empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one field update. Later updates to the same field win.
    pub fn push(&mut self, field: FieldUpdate) {
        self.fields.push(field);
    }

    /// Whether the patch carries no updates at all
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The field updates, in insertion order
    pub fn fields(&self) -> &[FieldUpdate] {
        &self.fields
    }

    /// Apply every field update to a log record, in order.
    pub fn apply(&self, record: &mut LogRecord) {
        for field in &self.fields {
            match field {
                FieldUpdate::DisplayName(v) => record.display_name = v.clone(),
                FieldUpdate::RawStartTime(v) => record.raw_start_time = v.clone(),
                FieldUpdate::RawEndTime(v) => record.raw_end_time = Some(v.clone()),
                FieldUpdate::CalendarDate(v) => record.calendar_date = v.clone(),
                FieldUpdate::Text(v) => record.text = v.clone(),
                FieldUpdate::CanonicalEnd(v) => record.canonical_end = Some(*v),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_record() -> LogRecord {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
        LogRecord {
            record_id: Uuid::new_v4(),
            stream_id: "mit6s081".to_string(),
            shard_key: 4,
            sort_key: key::sort_key(start),
            display_name: "MIT 6.S081".to_string(),
            calendar_date: "2024-03-15".to_string(),
            raw_start_time: "09:00".to_string(),
            raw_end_time: Some("10:30".to_string()),
            canonical_start: start,
            canonical_end: Some(Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap()),
            text: String::new(),
        }
    }

    #[test]
    fn test_record_key_combines_shard_and_sort() {
        let record = sample_record();
        let key = record.key();
        assert_eq!(key.partition_key, "LOG#4");
        assert_eq!(key.sort_key, "TIME#2024-03-15T09:00:00Z");
    }

    #[test]
    fn test_record_serializes_with_discriminator_tag() {
        let json = serde_json::to_value(Record::Log(sample_record())).unwrap();
        assert_eq!(json["recordType"], "LOG");
        assert_eq!(json["streamId"], "mit6s081");

        let stream = Record::Stream(StreamRecord {
            stream_id: "gym".to_string(),
            display_name: "Gym".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        });
        let json = serde_json::to_value(&stream).unwrap();
        assert_eq!(json["recordType"], "STREAM");
    }

    #[test]
    fn test_record_round_trips() {
        let record = Record::Log(sample_record());
        let json = serde_json::to_string(&record).unwrap();
        let restored: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(record, restored);
    }

    #[test]
    fn test_record_kind() {
        assert_eq!(Record::Log(sample_record()).kind(), RecordKind::Log);
    }

    #[test]
    fn test_patch_applies_only_listed_fields() {
        let mut record = sample_record();
        let original_sort = record.sort_key.clone();
        let original_start = record.canonical_start;

        let mut patch = UpdatePatch::new();
        patch.push(FieldUpdate::Text("reviewed lab 3".to_string()));
        patch.push(FieldUpdate::RawEndTime("11:00".to_string()));
        patch.apply(&mut record);

        assert_eq!(record.text, "reviewed lab 3");
        assert_eq!(record.raw_end_time.as_deref(), Some("11:00"));
        // Immutable keys untouched
        assert_eq!(record.sort_key, original_sort);
        assert_eq!(record.canonical_start, original_start);
    }

    #[test]
    fn test_patch_last_write_wins_within_patch() {
        let mut record = sample_record();
        let mut patch = UpdatePatch::new();
        patch.push(FieldUpdate::Text("first".to_string()));
        patch.push(FieldUpdate::Text("second".to_string()));
        patch.apply(&mut record);
        assert_eq!(record.text, "second");
    }

    #[test]
    fn test_empty_patch() {
        let patch = UpdatePatch::new();
        assert!(patch.is_empty());
        assert!(patch.fields().is_empty());
    }
}
