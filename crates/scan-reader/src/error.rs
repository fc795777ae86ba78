//! Error types for scan loading.

use thiserror::Error;

/// Result type for scan reader operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Error types for scan loading.
#[derive(Error, Debug)]
pub enum ScanError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Scan file not present in the dataset directory
    #[error("Scan not found: {0}")]
    NotFound(String),

    /// Missing required variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// File extension with no reader compiled in
    #[error("Unsupported scan format: {0}")]
    UnsupportedFormat(String),
}

impl From<serde_json::Error> for ScanError {
    fn from(err: serde_json::Error) -> Self {
        ScanError::InvalidFormat(format!("JSON error: {}", err))
    }
}

impl From<ring_common::RingError> for ScanError {
    fn from(err: ring_common::RingError) -> Self {
        ScanError::InvalidFormat(err.to_string())
    }
}
