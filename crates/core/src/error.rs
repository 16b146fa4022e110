//! Error types for Tracklog
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! The taxonomy follows how a caller should react:
//! - `Validation`: correct the input, never retry
//! - `Reconcile`: a date/time string matched no recognized pattern
//! - `Guard`: the conditional store guard failed; deliberately opaque about
//!   whether the key is absent or points at the wrong entity kind
//! - `Conflict`: unique-key insert collided
//! - `Store`: the external store failed; the only retryable kind

use crate::reconcile::ParseError;
use thiserror::Error;

/// Result type alias for Tracklog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the log engine
#[derive(Debug, Error)]
pub enum Error {
    /// A required input field is missing or empty
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The supplied pagination cursor could not be decoded
    #[error("invalid pagination cursor")]
    InvalidCursor,

    /// Stream display name exceeds the configured limit
    #[error("stream name too long: {actual} bytes exceeds maximum {max}")]
    NameTooLong {
        /// Actual name length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },

    /// An update request carried no allow-listed fields
    #[error("no updatable fields provided")]
    NothingToUpdate,

    /// A date/time string matched no recognized pattern
    #[error("unreconcilable timestamp: {0}")]
    Unreconcilable(#[from] ParseError),

    /// Guard failure on update/delete: the key does not identify a log record.
    /// One message for both "absent" and "wrong kind" - callers never learn which.
    #[error("record not found or not a log record")]
    NotFound,

    /// An updated canonical end would precede the record's canonical start
    #[error("canonical end precedes canonical start")]
    EndBeforeStart,

    /// Unique-key insert collided with an existing stream
    #[error("stream already exists: {0}")]
    StreamExists(String),

    /// Failure surfaced by the external store, message attached
    #[error("store error: {0}")]
    Store(String),
}

/// Coarse classification used by callers to decide retry vs. correct-input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing input, detected before any store call
    Validation,
    /// Date/time input matched no recognized pattern
    Reconcile,
    /// Conditional guard failed at apply time
    Guard,
    /// Unique-key conflict
    Conflict,
    /// External store failure
    Store,
}

impl Error {
    /// Classify this error for caller-side handling
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingField(_)
            | Error::InvalidCursor
            | Error::NameTooLong { .. }
            | Error::NothingToUpdate => ErrorKind::Validation,
            Error::Unreconcilable(_) => ErrorKind::Reconcile,
            Error::NotFound | Error::EndBeforeStart => ErrorKind::Guard,
            Error::StreamExists(_) => ErrorKind::Conflict,
            Error::Store(_) => ErrorKind::Store,
        }
    }

    /// Whether a caller may reasonably retry the operation unchanged
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Store
    }

    /// Stable reason code for wire protocols and logs
    pub fn reason_code(&self) -> &'static str {
        match self {
            Error::MissingField(_) => "missing_field",
            Error::InvalidCursor => "invalid_cursor",
            Error::NameTooLong { .. } => "name_too_long",
            Error::NothingToUpdate => "nothing_to_update",
            Error::Unreconcilable(_) => "unreconcilable_timestamp",
            Error::NotFound => "not_found_or_wrong_type",
            Error::EndBeforeStart => "end_before_start",
            Error::StreamExists(_) => "stream_exists",
            Error::Store(_) => "store_error",
        }
    }
}
