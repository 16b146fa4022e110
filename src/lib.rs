//! Tracklog - temporal log indexing and reconciliation engine
//!
//! Tracklog turns loosely-structured activity entries into a time-ordered,
//! partition-friendly log: writes get a random shard key and a
//! lexicographically time-ordered sort key, reads traverse a secondary
//! `(stream, time)` index newest-first with opaque cursors, and ambiguous
//! local date/time strings are reconciled into canonical UTC instants.
//!
//! # Quick Start
//!
//! ```
//! use tracklog::{ephemeral, WriteRequest, QueryRequest};
//!
//! let log = ephemeral();
//!
//! log.record(WriteRequest {
//!     stream_display_name: "MIT 6.S081".into(),
//!     calendar_date: "2024-03-15".into(),
//!     start_time: "09:00".into(),
//!     end_time: Some("10:30".into()),
//!     text: None,
//! })?;
//!
//! let page = log.query(QueryRequest {
//!     stream_display_name: "mit 6 s081".into(),
//!     ..QueryRequest::default()
//! })?;
//! assert_eq!(page.records.len(), 1);
//! # Ok::<(), tracklog::Error>(())
//! ```
//!
//! # Architecture
//!
//! The engine ([`TimeLog`]) is stateless over an injected [`Store`] handle.
//! Production deployments supply their own store client; [`MemoryStore`]
//! is the bundled reference implementation with identical semantics.

use std::sync::Arc;

pub use tracklog_core::error::{Error, ErrorKind, Result};
pub use tracklog_core::key;
pub use tracklog_core::limits::Limits;
pub use tracklog_core::reconcile;
pub use tracklog_core::traits::{IndexPage, IndexPosition, IndexQuery, Store};
pub use tracklog_core::types::{
    FieldUpdate, LogRecord, Record, RecordKey, RecordKind, StreamRecord, UpdatePatch,
};
pub use tracklog_engine::{
    cursor, QueryPage, QueryRequest, TimeLog, UpdateRequest, WriteReceipt, WriteRequest,
};
pub use tracklog_store::MemoryStore;

/// Open an engine over a fresh in-memory store.
pub fn ephemeral() -> TimeLog {
    TimeLog::new(Arc::new(MemoryStore::new()))
}
