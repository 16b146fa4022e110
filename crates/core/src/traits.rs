//! The store contract the engine issues requests against
//!
//! The engine never implements storage itself; it builds well-formed requests
//! against this trait and a long-lived handle is injected at construction.
//! Implementations must provide per-key atomicity for the guarded operations:
//! the discriminator check on update/delete happens at apply time, not via a
//! prior read, so a concurrently-deleted row fails atomically rather than
//! producing a partial write.

use crate::error::Result;
use crate::types::{LogRecord, RecordKey, StreamRecord, UpdatePatch};
use serde::{Deserialize, Serialize};

/// Continuation position in the secondary time index.
///
/// Opaque to callers once cursor-encoded; carries everything needed to
/// resume a descending traversal: the index partition (`stream_id`), the
/// index sort position, and the primary partition key that disambiguates
/// records sharing a sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPosition {
    /// Index partition
    #[serde(rename = "streamId")]
    pub stream_id: String,
    /// Sort key of the last evaluated record
    #[serde(rename = "sortKey")]
    pub sort_key: String,
    /// Primary partition key of the last evaluated record
    #[serde(rename = "partitionKey")]
    pub partition_key: String,
}

/// A descending range query against the secondary time index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
    /// Index partition to traverse
    pub stream_id: String,
    /// Optional inclusive sort-key bounds (single-day windowing)
    pub range: Option<(String, String)>,
    /// Maximum records per page
    pub limit: usize,
    /// Resume strictly after this position; `None` starts at the newest record
    pub start_after: Option<IndexPosition>,
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexPage {
    /// Matching records, newest first
    pub records: Vec<LogRecord>,
    /// Position of the last returned record, present only when more records
    /// exist beyond this page. Never an empty placeholder.
    pub last_evaluated: Option<IndexPosition>,
}

/// External store service.
///
/// Supports point writes keyed by a partition+sort pair, guarded point
/// deletes and partial updates, and secondary-index range queries with
/// continuation support. All methods are safe to call concurrently; the only
/// cross-operation coordination is the store's own per-key atomic guards.
pub trait Store: Send + Sync {
    /// Persist a log record keyed by its partition+sort pair.
    ///
    /// A write to an existing key overwrites it (point-write semantics).
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the store fails.
    fn put_log(&self, record: LogRecord) -> Result<()>;

    /// Apply a sparse update to the identified record, guarded on the row
    /// being a log record.
    ///
    /// A patch that would set a canonical end earlier than the stored
    /// canonical start must be rejected whole; the start is immutable, so
    /// the check needs no coordination beyond the per-key guard.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` when the key is absent *or* identifies a non-log
    /// row - implementations must not distinguish the two.
    /// `Error::EndBeforeStart` when the patch violates end ordering.
    fn update_log(&self, key: &RecordKey, patch: &UpdatePatch) -> Result<()>;

    /// Delete the identified record under the same guard as [`update_log`].
    ///
    /// # Errors
    ///
    /// `Error::NotFound` under the same conditions as update.
    ///
    /// [`update_log`]: Store::update_log
    fn delete_log(&self, key: &RecordKey) -> Result<()>;

    /// Execute a descending range query over the secondary time index.
    ///
    /// Results are ordered newest-first by (sort key, partition key). The
    /// returned page carries a continuation position only when more records
    /// remain past it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the store fails.
    fn query_index(&self, query: &IndexQuery) -> Result<IndexPage>;

    /// Insert a stream-registry record, conditional on its `stream_id` not
    /// existing yet.
    ///
    /// # Errors
    ///
    /// `Error::StreamExists` when the unique-key condition fails.
    fn create_stream(&self, stream: StreamRecord) -> Result<()>;

    /// Scan all stream-registry records.
    ///
    /// The registry is tiny (one row per named stream), so a full scan is
    /// the intended access pattern.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the store fails.
    fn list_streams(&self) -> Result<Vec<StreamRecord>>;
}
