//! Error types for training.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainError {
    #[error("dataset error: {0}")]
    Dataset(#[from] dataset::DatasetError),

    #[error("checkpoint I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("checkpoint encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid checkpoint: {0}")]
    InvalidCheckpoint(String),
}

pub type TrainResult<T> = std::result::Result<T, TrainError>;
