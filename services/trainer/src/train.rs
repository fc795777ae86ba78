//! The training loop.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use dataset::DataLoader;

use crate::checkpoint::CheckpointWriter;
use crate::error::TrainResult;
use crate::model::Model;
use crate::optim::Sgd;

/// Mean loss per epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub train: Vec<f32>,
    pub validation: Vec<f32>,
}

impl History {
    pub fn epochs(&self) -> usize {
        self.train.len()
    }

    /// Epoch (1-based) with the lowest finite validation loss.
    pub fn best_epoch(&self) -> Option<usize> {
        self.validation
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i + 1)
    }
}

/// Mean total loss over the loader's batches, without updating the model.
///
/// NaN when the loader yields no batches.
pub fn evaluate<M: Model>(model: &M, loader: &mut DataLoader<'_>) -> TrainResult<f32> {
    let mut sum = 0.0f64;
    let mut batches = 0usize;
    for batch in loader.epoch() {
        let batch = batch?;
        sum += model.loss(&batch).total() as f64;
        batches += 1;
    }

    if batches == 0 {
        warn!(rows = loader.len(), "No batches to evaluate");
        return Ok(f32::NAN);
    }
    Ok((sum / batches as f64) as f32)
}

/// One pass over `loader` with a parameter update per batch.
///
/// Returns the mean total loss, NaN if no batch was produced.
pub fn train_epoch<M: Model>(
    model: &mut M,
    optimizer: &mut Sgd,
    loader: &mut DataLoader<'_>,
) -> TrainResult<f32> {
    let mut sum = 0.0f64;
    let mut batches = 0usize;
    for batch in loader.epoch() {
        let batch = batch?;
        let (losses, grad) = model.loss_and_grad(&batch);
        optimizer.step(model.parameters_mut(), &grad);

        debug!(batch = batches, samples = batch.len(), losses = %losses, "Batch done");
        sum += losses.total() as f64;
        batches += 1;
    }

    if batches == 0 {
        warn!(rows = loader.len(), "No training batches in epoch");
        return Ok(f32::NAN);
    }
    Ok((sum / batches as f64) as f32)
}

/// Train for `epochs` epochs, validating and optionally checkpointing after
/// each one.
pub fn train<M: Model>(
    model: &mut M,
    optimizer: &mut Sgd,
    train_loader: &mut DataLoader<'_>,
    validation_loader: &mut DataLoader<'_>,
    epochs: usize,
    checkpoints: Option<&CheckpointWriter>,
) -> TrainResult<History> {
    info!(
        model = model.name(),
        epochs,
        train_rows = train_loader.len(),
        validation_rows = validation_loader.len(),
        batch_size = train_loader.batch_size(),
        lr = optimizer.config().lr,
        "Starting training"
    );

    let mut history = History::default();
    for epoch in 1..=epochs {
        let train_loss = train_epoch(model, optimizer, train_loader)?;
        let validation_loss = evaluate(model, validation_loader)?;

        info!(epoch, epochs, train_loss, validation_loss, "Epoch complete");
        history.train.push(train_loss);
        history.validation.push(validation_loss);

        if let Some(writer) = checkpoints {
            writer.save(model, epoch, train_loss, validation_loss)?;
        }
    }

    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_epoch_skips_nan() {
        let history = History {
            train: vec![1.0, 0.8, 0.7],
            validation: vec![0.9, f32::NAN, 0.85],
        };
        assert_eq!(history.epochs(), 3);
        assert_eq!(history.best_epoch(), Some(3));
    }

    #[test]
    fn test_best_epoch_empty() {
        assert_eq!(History::default().best_epoch(), None);
    }
}
