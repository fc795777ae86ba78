//! Training loop for closed-ring detection.
//!
//! Batches come from [`dataset::DataLoader`]; the model is anything
//! implementing [`Model`]. Each epoch runs forward, loss, backward and an
//! [`Sgd`] step per batch, then a validation pass, and can save a JSON
//! checkpoint.

pub mod checkpoint;
pub mod error;
pub mod model;
pub mod optim;
pub mod train;

pub use checkpoint::{Checkpoint, CheckpointWriter};
pub use error::{TrainError, TrainResult};
pub use model::{LossDict, Model, PixelClassifier, NUM_CLASSES};
pub use optim::{Sgd, SgdConfig};
pub use train::{evaluate, train, train_epoch, History};
