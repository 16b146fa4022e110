//! The `TimeLog` facade: write, query, update, delete, plus the stream
//! registry.
//!
//! Write path: reconcile timestamps, derive keys, persist. Read path: derive
//! the stream id, build index bounds and continuation position, dispatch,
//! re-encode the cursor. Updates and deletes pass through the partial update
//! guard. The engine performs no retries; store failures surface unchanged
//! as retryable errors.

use crate::cursor;
use crate::update::{self, UpdateRequest};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use tracklog_core::error::{Error, Result};
use tracklog_core::key;
use tracklog_core::limits::Limits;
use tracklog_core::reconcile;
use tracklog_core::traits::{IndexQuery, Store};
use tracklog_core::types::{LogRecord, RecordKey, StreamRecord};
use uuid::Uuid;

/// A request to persist one activity entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteRequest {
    /// Stream the entry belongs to, by display name
    pub stream_display_name: String,
    /// Calendar date, `-` or `/` separated
    pub calendar_date: String,
    /// Start time string in any recognized form
    pub start_time: String,
    /// Optional end time string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Optional free-form note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Acknowledgment of a persisted write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteReceipt {
    /// Derived stream identifier
    pub stream_id: String,
    /// Id assigned to the new record
    pub record_id: Uuid,
    /// Full primary key of the new record
    pub key: RecordKey,
}

/// A paginated read of one stream, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Stream to read, by display name
    pub stream_display_name: String,
    /// Resume token from a previous page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Optional single-day window, `YYYY-MM-DD` (`/` accepted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_date: Option<String>,
}

/// One page of query results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPage {
    /// Matching records, newest first
    pub records: Vec<LogRecord>,
    /// Resume token, present only when more records exist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// The temporal log engine.
///
/// Stateless over an injected store handle; cheap to clone and safe to use
/// concurrently.
#[derive(Clone)]
pub struct TimeLog {
    store: Arc<dyn Store>,
    limits: Limits,
}

impl TimeLog {
    /// Create an engine over a store handle with default limits
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_limits(store, Limits::default())
    }

    /// Create an engine with custom limits
    pub fn with_limits(store: Arc<dyn Store>, limits: Limits) -> Self {
        Self { store, limits }
    }

    /// The limits this engine enforces
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    // ========== Write ==========

    /// Reconcile, key, and persist one activity entry.
    ///
    /// The start instant must reconcile - without it there is no sort key.
    /// An end time that fails to reconcile is kept as its raw string only;
    /// the record is stored without a canonical end and therefore without a
    /// computable duration.
    ///
    /// # Errors
    ///
    /// Validation errors for missing fields, `Error::Unreconcilable` for an
    /// unusable date or start time, `Error::Store` if persistence fails.
    pub fn record(&self, request: WriteRequest) -> Result<WriteReceipt> {
        let display_name = require(&request.stream_display_name, "streamDisplayName")?;
        let calendar_date = require(&request.calendar_date, "calendarDate")?;
        let start_time = require(&request.start_time, "startTime")?;
        self.check_name(display_name)?;

        let stream_id = self.stream_id(display_name)?;
        let reconciled =
            reconcile::reconcile(calendar_date, start_time, request.end_time.as_deref())?;
        if reconciled.end.is_none() {
            if let Some(raw) = request.end_time.as_deref().map(str::trim) {
                if !raw.is_empty() {
                    warn!(stream = %stream_id, end = raw, "storing record without canonical end");
                }
            }
        }

        let record = LogRecord {
            record_id: Uuid::new_v4(),
            stream_id: stream_id.clone(),
            shard_key: key::draw_shard(&mut rand::thread_rng(), &self.limits),
            sort_key: key::sort_key(reconciled.start),
            // The display name is retained verbatim, not the folded id
            display_name: request.stream_display_name.clone(),
            calendar_date: request.calendar_date.clone(),
            raw_start_time: request.start_time.clone(),
            raw_end_time: request.end_time.clone(),
            canonical_start: reconciled.start,
            canonical_end: reconciled.end,
            text: request.text.unwrap_or_default(),
        };

        let receipt = WriteReceipt {
            stream_id,
            record_id: record.record_id,
            key: record.key(),
        };
        debug!(stream = %receipt.stream_id, sort = %receipt.key.sort_key, "write log record");
        self.store.put_log(record)?;
        Ok(receipt)
    }

    // ========== Query ==========

    /// Read one page of a stream, newest first.
    ///
    /// A malformed date filter is ignored (the query falls back to the
    /// unfiltered form); a malformed cursor is rejected.
    ///
    /// # Errors
    ///
    /// `Error::MissingField` without a stream name, `Error::InvalidCursor`
    /// for a bad resume token, `Error::Store` if the store fails.
    pub fn query(&self, request: QueryRequest) -> Result<QueryPage> {
        let display_name = require(&request.stream_display_name, "streamDisplayName")?;
        let stream_id = self.stream_id(display_name)?;

        let start_after = request.cursor.as_deref().map(cursor::decode).transpose()?;
        let range = match request.calendar_date.as_deref().map(str::trim) {
            Some(date) if !date.is_empty() => {
                let bounds = key::day_bounds(date);
                if bounds.is_none() {
                    warn!(filter = date, "ignoring malformed date filter");
                }
                bounds
            }
            _ => None,
        };

        debug!(stream = %stream_id, windowed = range.is_some(), "query stream");
        let page = self.store.query_index(&IndexQuery {
            stream_id,
            range,
            limit: self.limits.page_size,
            start_after,
        })?;

        Ok(QueryPage {
            cursor: page.last_evaluated.as_ref().map(cursor::encode),
            records: page.records,
        })
    }

    // ========== Update / Delete ==========

    /// Apply a sparse, allow-listed update to one record.
    ///
    /// Fields outside the allow-list are silently ignored; an update that
    /// carries none of the allowed fields is rejected before the store is
    /// contacted. The store enforces the log-record guard at apply time.
    ///
    /// # Errors
    ///
    /// `Error::NothingToUpdate`, `Error::NotFound` on guard failure,
    /// `Error::EndBeforeStart` for an end instant preceding the stored
    /// start, or `Error::Store`.
    pub fn update(&self, request: UpdateRequest) -> Result<()> {
        check_key(&request.key)?;
        let patch = update::patch_from_fields(&request.fields)?;
        debug!(sort = %request.key.sort_key, "update log record");
        self.store.update_log(&request.key, &patch)
    }

    /// Delete one record under the log-record guard.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` when the key is absent or identifies a non-log row.
    pub fn delete(&self, key: RecordKey) -> Result<()> {
        check_key(&key)?;
        debug!(sort = %key.sort_key, "delete log record");
        self.store.delete_log(&key)
    }

    // ========== Stream Registry ==========

    /// Register a new named stream.
    ///
    /// # Errors
    ///
    /// `Error::StreamExists` when the derived id is already registered.
    pub fn create_stream(&self, display_name: &str) -> Result<StreamRecord> {
        let display_name = require(display_name, "streamDisplayName")?;
        self.check_name(display_name)?;
        let stream = StreamRecord {
            stream_id: self.stream_id(display_name)?,
            display_name: display_name.to_string(),
            created_at: Utc::now(),
        };
        self.store.create_stream(stream.clone())?;
        Ok(stream)
    }

    /// List every registered stream.
    pub fn streams(&self) -> Result<Vec<StreamRecord>> {
        self.store.list_streams()
    }

    // ========== Helpers ==========

    fn stream_id(&self, display_name: &str) -> Result<String> {
        let id = key::stream_id(display_name);
        if id.is_empty() {
            // Nothing survived folding; the name cannot identify a stream
            return Err(Error::MissingField("streamDisplayName"));
        }
        Ok(id)
    }

    fn check_name(&self, display_name: &str) -> Result<()> {
        let actual = display_name.len();
        let max = self.limits.max_stream_name_bytes;
        if actual > max {
            return Err(Error::NameTooLong { actual, max });
        }
        Ok(())
    }
}

fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::MissingField(field));
    }
    Ok(trimmed)
}

fn check_key(key: &RecordKey) -> Result<()> {
    require(&key.partition_key, "partitionKey")?;
    require(&key.sort_key, "sortKey")?;
    Ok(())
}
