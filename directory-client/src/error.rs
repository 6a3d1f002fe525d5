//! Client error types

use thiserror::Error;

/// Directory client error type
///
/// Only `Transport` escapes the client after retries are exhausted; API
/// errors are logged at the call site and surfaced as `None`/`false`.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// HTTP transport failed, retries exhausted
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Structured application error reported by the directory
    #[error("Directory error: {0}")]
    Api(String),

    /// Response did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for directory operations
pub type DirectoryResult<T> = Result<T, DirectoryError>;
