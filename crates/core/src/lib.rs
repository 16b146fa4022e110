//! Core types and traits for Tracklog
//!
//! This crate defines the foundational pieces used throughout the system:
//! - LogRecord / StreamRecord: the two entity kinds sharing one physical store
//! - Record: tagged union over both kinds (the stored discriminator string is
//!   a serialization detail, not application-visible type inspection)
//! - Key scheme: stream identifiers, write-shard partition keys, time-ordered
//!   sort keys
//! - Reconcile: canonicalization of loosely-structured date/time input into
//!   UTC instants, plus duration math
//! - Limits: frozen operational limits (page size, shard count)
//! - Error: error taxonomy with retryability classification
//! - Traits: the `Store` contract the engine issues requests against

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod key;
pub mod limits;
pub mod reconcile;
pub mod traits;
pub mod types;

// Re-export commonly used types and traits
pub use error::{Error, ErrorKind, Result};
pub use limits::Limits;
pub use traits::{IndexPage, IndexPosition, IndexQuery, Store};
pub use types::{FieldUpdate, LogRecord, Record, RecordKey, RecordKind, StreamRecord, UpdatePatch};
