//! Shared error types.

use thiserror::Error;

/// Failure to encode or decode a wire frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to encode frame: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode frame: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("invalid ISO-8601 timestamp: {0:?}")]
    InvalidTimestamp(String),
    #[error("response carries no timestamp")]
    MissingTimestamp,
}
