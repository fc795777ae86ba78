//! Per-epoch model checkpoints as JSON files.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{TrainError, TrainResult};
use crate::model::Model;

/// Saved model state after an epoch.
///
/// Losses that were NaN (no batches) are stored as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub model: String,
    /// 1-based epoch number
    pub epoch: usize,
    pub train_loss: Option<f32>,
    pub validation_loss: Option<f32>,
    pub parameters: Vec<f32>,
}

impl Checkpoint {
    /// Training loss, NaN when none was recorded.
    pub fn train_loss(&self) -> f32 {
        self.train_loss.unwrap_or(f32::NAN)
    }

    /// Validation loss, NaN when none was recorded.
    pub fn validation_loss(&self) -> f32 {
        self.validation_loss.unwrap_or(f32::NAN)
    }

    pub fn read(path: &Path) -> TrainResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Copy the saved parameters into `model`.
    pub fn restore<M: Model>(&self, model: &mut M) -> TrainResult<()> {
        if self.model != model.name() || self.parameters.len() != model.parameters().len() {
            return Err(TrainError::InvalidCheckpoint(format!(
                "checkpoint holds {} with {} parameters, model is {} with {}",
                self.model,
                self.parameters.len(),
                model.name(),
                model.parameters().len()
            )));
        }
        model.parameters_mut().copy_from_slice(&self.parameters);
        Ok(())
    }
}

/// Writes `checkpoint_epoch_{n}.json` files into a directory.
#[derive(Debug, Clone)]
pub struct CheckpointWriter {
    dir: PathBuf,
}

impl CheckpointWriter {
    /// Creates the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> TrainResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, epoch: usize) -> PathBuf {
        self.dir.join(format!("checkpoint_epoch_{}.json", epoch))
    }

    pub fn save<M: Model>(
        &self,
        model: &M,
        epoch: usize,
        train_loss: f32,
        validation_loss: f32,
    ) -> TrainResult<PathBuf> {
        let checkpoint = Checkpoint {
            model: model.name().to_string(),
            epoch,
            train_loss: finite(train_loss),
            validation_loss: finite(validation_loss),
            parameters: model.parameters().to_vec(),
        };
        let path = self.path_for(epoch);
        fs::write(&path, serde_json::to_string_pretty(&checkpoint)?)?;
        info!(epoch, path = %path.display(), "Saved checkpoint");
        Ok(path)
    }
}

fn finite(loss: f32) -> Option<f32> {
    loss.is_finite().then_some(loss)
}
