//! Image rendering for wind scans and training curves.
//!
//! Implements:
//! - Quiver plots of a scan around a storm centre
//! - Loss-curve line charts
//! - Discrete colour scales (turbo)
//! - PNG encoding
//!
//! Scenes are built as SVG and rasterized with resvg/tiny-skia.

pub mod chart;
pub mod colormap;
pub mod error;
pub mod png;
pub mod quiver;
pub mod svg;

pub use chart::{render_loss_curves, ChartConfig};
pub use colormap::{turbo, Color, DiscreteColormap};
pub use error::{RenderError, RenderResult};
pub use quiver::{render_scan, top_speed_points, QuiverConfig, ScanView, SpeedPoint};
