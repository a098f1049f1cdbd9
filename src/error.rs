//! Error handling types for stitch-ls.
//!
//! Per-request failures (unknown file, missing mapping segment, stale cache)
//! degrade to empty results and never surface here; `CoreError` covers the
//! conditions a caller must be able to distinguish.

use thiserror::Error;

/// Error type for language-service core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// URI could not be converted to a filesystem path, or back
    #[error("Invalid URI: {uri}")]
    InvalidUri { uri: String },

    /// A synthesizer produced a mapping table that violates the coverage
    /// invariants (gaps, overlaps, or unsorted segments)
    #[error("Invalid mapping table: {message}")]
    InvalidMapping { message: String },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn invalid_uri(uri: impl Into<String>) -> Self {
        CoreError::InvalidUri { uri: uri.into() }
    }

    pub fn invalid_mapping(message: impl Into<String>) -> Self {
        CoreError::InvalidMapping {
            message: message.into(),
        }
    }
}
