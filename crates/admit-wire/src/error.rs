//! Error types for wire-level parsing.

use thiserror::Error;

/// Result type for wire operations.
pub type Result<T> = std::result::Result<T, WireError>;

/// Errors that can occur while encoding or decoding wire payloads.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum WireError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
