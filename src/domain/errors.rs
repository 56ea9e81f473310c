//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

/// Transport-level failure taxonomy for the backend API.
///
/// Every gateway failure (connection, status, body) normalizes into exactly
/// one of these. Retry policy, if any, belongs to the caller.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("server error (status {status}): {message}")]
    Server { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Application-level errors surfaced to the inbound adapter.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("backend API error: {0}")]
    Api(#[from] ApiError),

    #[error("input error: {0}")]
    Input(String),

    #[error("configuration error: {0}")]
    Config(String),
}
