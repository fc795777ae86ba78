//! Dataset adapter for closed-ring segmentation and detection.
//!
//! Turns rows of a labeled event table into fixed-size samples:
//!
//! - an 80 × 80 window cropped from the scan around the storm centre
//!   ([`window`])
//! - a `(3, 80, 80)` tensor of U, V and validity ([`sample`])
//! - a per-pixel class mask and a detection box of a configurable radius
//! - optional per-channel z-score normalization ([`normalize`])
//!
//! [`loader`] splits a dataset into train/validation/test subsets and yields
//! batches prepared in parallel.

pub mod config;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod sample;
pub mod window;

pub use config::{DatasetOptions, DEFAULT_RADIUS_KM};
pub use dataset::CycloneDataset;
pub use error::{DatasetError, DatasetResult, WindowError};
pub use loader::{random_split, split_lengths, Batch, DataLoader, Epoch, SplitLengths};
pub use normalize::{channel_stats, z_score, ChannelStats};
pub use sample::{
    build_sample, DetectionTarget, Sample, SegmentationMask, Tensor3, INPUT_CHANNELS,
    MISSING_SENTINEL,
};
pub use window::{nearest_cell, select_window, valid_extent, Window, WINDOW_COLS, WINDOW_ROWS};
