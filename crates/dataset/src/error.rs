//! Error types for the dataset adapter.

use thiserror::Error;

/// Reasons a scan cannot be cropped around its storm centre.
///
/// Every variant means "skip this row"; none of them is fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// The target coordinate is NaN or no cell has coordinates.
    #[error("no valid grid cell near the target")]
    NoValidNeighbor,

    /// The nearest cell lies in the missing-data border of the swath.
    #[error("target cell ({row}, {col}) is outside the valid swath")]
    TargetOutsideSwath { row: usize, col: usize },

    /// Fewer rows or columns than the window after trimming.
    #[error("grid of {rows}x{cols} valid cells is smaller than the {min_rows}x{min_cols} window")]
    GridTooSmall {
        rows: usize,
        cols: usize,
        min_rows: usize,
        min_cols: usize,
    },
}

/// Errors that can occur while building samples.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Failed to read the event table.
    #[error("failed to read event table: {0}")]
    Table(#[from] ring_common::RingError),

    /// Failed to load a scan.
    #[error("failed to load scan: {0}")]
    Scan(#[from] scan_reader::ScanError),

    /// Sample index past the end of the table.
    #[error("index {index} out of range for dataset of {len} rows")]
    IndexOutOfRange { index: usize, len: usize },

    /// Split fractions or lengths that do not fit the dataset.
    #[error("invalid split: {0}")]
    InvalidSplit(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl DatasetError {
    /// Create an InvalidSplit error.
    pub fn invalid_split(msg: impl Into<String>) -> Self {
        Self::InvalidSplit(msg.into())
    }

    /// Create a ConfigError.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

/// Result type for dataset operations.
pub type DatasetResult<T> = std::result::Result<T, DatasetError>;
