//! Opaque pagination cursors
//!
//! A cursor is the Base64 encoding of the JSON form of an [`IndexPosition`].
//! Callers treat it as an opaque resume token; nothing about its contents is
//! contractual. Decoding is strict: any malformed token is a validation
//! error, not a silent restart from the newest record.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracklog_core::error::{Error, Result};
use tracklog_core::traits::IndexPosition;

/// Encode a continuation position as an opaque token.
pub fn encode(position: &IndexPosition) -> String {
    // Serializing three plain strings cannot fail
    let json = serde_json::to_vec(position).unwrap_or_default();
    STANDARD.encode(json)
}

/// Decode a caller-supplied token back into a continuation position.
///
/// # Errors
///
/// `Error::InvalidCursor` for anything that is not a token this engine
/// produced.
pub fn decode(token: &str) -> Result<IndexPosition> {
    let bytes = STANDARD.decode(token).map_err(|_| Error::InvalidCursor)?;
    serde_json::from_slice(&bytes).map_err(|_| Error::InvalidCursor)
}
