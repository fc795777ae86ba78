//! Error types shared by the workspace crates.

use thiserror::Error;

/// Result type alias using RingError.
pub type RingResult<T> = Result<T, RingError>;

/// Primary error type for table and grid handling.
#[derive(Debug, Error)]
pub enum RingError {
    // === Table Errors ===
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid value for '{column}' on line {line}: {value}")]
    InvalidValue {
        column: String,
        line: usize,
        value: String,
    },

    #[error("Row on line {line} has {found} cells, header has {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    // === Grid Errors ===
    #[error("Grid variable '{name}' has {found} values, expected {expected}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    // === I/O ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
