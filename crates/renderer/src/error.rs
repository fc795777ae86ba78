//! Error types for rendering.

use thiserror::Error;

/// Errors that can occur while producing an image.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Canvas dimensions that cannot be allocated.
    #[error("invalid image size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    /// A view with zero or negative extent.
    #[error("empty view: {0}")]
    EmptyView(String),

    /// Nothing to plot.
    #[error("no data to render")]
    NoData,

    /// The generated SVG could not be parsed.
    #[error("svg error: {0}")]
    Svg(String),

    /// PNG encoding failed.
    #[error("png encoding failed: {0}")]
    Encode(String),
}

/// Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
