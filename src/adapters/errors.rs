//! Funding source error types
//!
//! All collection-related errors are wrapped in SourceError enum
//! which implements thiserror for consistent error handling.

use thiserror::Error;

/// Errors raised while fetching a funding snapshot
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP request failed or returned a non-success status
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Fetch did not complete in time
    #[error("Source timeout after {0}ms")]
    Timeout(u64),

    /// Payload could not be parsed as a funding snapshot
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Snapshot file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Http(format!("timed out: {}", err))
        } else {
            SourceError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::InvalidResponse(err.to_string())
    }
}

/// Result type alias for source operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;
