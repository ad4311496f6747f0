//! Error types for the chat client.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur in the chat/notification client.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Wire error: {0}")]
    Wire(#[from] admit_wire::WireError),
}
