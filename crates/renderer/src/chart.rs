//! Line charts of per-epoch training and validation loss.

use tracing::debug;

use crate::colormap::Color;
use crate::error::{RenderError, RenderResult};
use crate::svg::{Anchor, SvgCanvas};

/// Configuration for loss-curve charts
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub train_color: Color,
    pub validation_color: Color,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            title: "Training and Validation Loss over Epochs".to_string(),
            train_color: Color::rgb(0x1f, 0x77, 0xb4),
            validation_color: Color::rgb(0xff, 0x7f, 0x0e),
        }
    }
}

/// Plot area margins in pixels: left, right, top, bottom.
const MARGINS: (f32, f32, f32, f32) = (80.0, 30.0, 50.0, 60.0);

/// Render training and validation loss per epoch (epoch 1 first) as a PNG.
///
/// Non-finite losses leave a gap in their curve.
pub fn render_loss_curves(
    train: &[f32],
    validation: &[f32],
    config: &ChartConfig,
) -> RenderResult<Vec<u8>> {
    let epochs = train.len().max(validation.len());
    let finite = train
        .iter()
        .chain(validation)
        .copied()
        .filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if epochs == 0 || lo > hi {
        return Err(RenderError::NoData);
    }

    let (left, right, top, bottom) = MARGINS;
    let plot_w = config.width as f32 - left - right;
    let plot_h = config.height as f32 - top - bottom;
    if plot_w <= 0.0 || plot_h <= 0.0 {
        return Err(RenderError::InvalidSize {
            width: config.width,
            height: config.height,
        });
    }

    let (y_min, y_max, y_step) = nice_range(lo, hi);
    let x_span = (epochs.max(2) - 1) as f32;
    let to_px = |epoch: usize, loss: f32| {
        (
            left + (epoch - 1) as f32 / x_span * plot_w,
            top + (y_max - loss) / (y_max - y_min) * plot_h,
        )
    };

    let mut canvas = SvgCanvas::new(config.width, config.height);

    // Grid and tick labels
    let mut y = y_min;
    while y <= y_max + y_step * 0.5 {
        let (_, py) = to_px(1, y);
        canvas.line(left, py, left + plot_w, py, Color::GRID, 0.6);
        canvas.text(left - 8.0, py + 4.0, &format_tick(y, y_step), 12.0, Anchor::End, Color::BLACK);
        y += y_step;
    }
    for epoch in epoch_ticks(epochs) {
        let (px, _) = to_px(epoch, y_min);
        canvas.line(px, top, px, top + plot_h, Color::GRID, 0.6);
        canvas.text(
            px,
            top + plot_h + 18.0,
            &epoch.to_string(),
            12.0,
            Anchor::Middle,
            Color::BLACK,
        );
    }
    canvas.outline(left, top, plot_w, plot_h, Color::BLACK, 1.0);

    for (values, color) in [(train, config.train_color), (validation, config.validation_color)] {
        for segment in finite_segments(values) {
            let points: Vec<(f32, f32)> =
                segment.iter().map(|&(epoch, v)| to_px(epoch, v)).collect();
            canvas.polyline(&points, color, 2.0);
            if points.len() == 1 {
                canvas.circle(points[0].0, points[0].1, 2.5, color);
            }
        }
    }

    // Legend
    let lx = left + plot_w - 170.0;
    let ly = top + 14.0;
    canvas.rect(lx - 10.0, ly - 12.0, 175.0, 50.0, Color::WHITE, Some((Color::GRID, 0.8)));
    for (i, (label, color)) in [
        ("Training Loss", config.train_color),
        ("Validation Loss", config.validation_color),
    ]
    .into_iter()
    .enumerate()
    {
        let row_y = ly + i as f32 * 20.0;
        canvas.line(lx, row_y, lx + 28.0, row_y, color, 2.0);
        canvas.text(lx + 36.0, row_y + 4.0, label, 12.0, Anchor::Start, Color::BLACK);
    }

    canvas.text(config.width as f32 / 2.0, 30.0, &config.title, 16.0, Anchor::Middle, Color::BLACK);
    canvas.text(
        left + plot_w / 2.0,
        config.height as f32 - 15.0,
        "Epoch",
        13.0,
        Anchor::Middle,
        Color::BLACK,
    );
    canvas.vertical_text(22.0, top + plot_h / 2.0, "Loss", 13.0, Color::BLACK);

    debug!(epochs, "Rendered loss curves");
    canvas.render_png()
}

/// Axis range covering `lo..=hi` on multiples of a 1/2/5 step.
fn nice_range(lo: f32, hi: f32) -> (f32, f32, f32) {
    let span = if hi > lo { hi - lo } else { lo.abs().max(1.0) };
    let raw = span / 5.0;
    let magnitude = 10f32.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|&s| s >= raw)
        .unwrap_or(10.0 * magnitude);

    let mut min = (lo / step).floor() * step;
    let mut max = (hi / step).ceil() * step;
    if max <= min {
        min -= step;
        max += step;
    }
    (min, max, step)
}

fn format_tick(value: f32, step: f32) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10().floor()) as usize
    };
    format!("{:.*}", decimals, value)
}

/// At most ~10 evenly spaced epochs, always including the first and last.
fn epoch_ticks(epochs: usize) -> Vec<usize> {
    let every = ((epochs + 9) / 10).max(1);
    let mut ticks: Vec<usize> = (1..=epochs).step_by(every).collect();
    if ticks.last() != Some(&epochs) {
        ticks.push(epochs);
    }
    ticks
}

/// Runs of finite values as (epoch, value) pairs, epochs 1-based.
fn finite_segments(values: &[f32]) -> Vec<Vec<(usize, f32)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (i, &v) in values.iter().enumerate() {
        if v.is_finite() {
            current.push((i + 1, v));
        } else if !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nice_range_covers_data() {
        let (min, max, step) = nice_range(0.23, 1.87);
        assert!(min <= 0.23 && max >= 1.87);
        assert!((step - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_nice_range_constant_series() {
        let (min, max, _) = nice_range(2.0, 2.0);
        assert!(min < 2.0 && max > 2.0);
    }

    #[test]
    fn test_epoch_ticks() {
        assert_eq!(epoch_ticks(1), vec![1]);
        assert_eq!(epoch_ticks(5), vec![1, 2, 3, 4, 5]);
        assert_eq!(epoch_ticks(20), vec![1, 3, 5, 7, 9, 11, 13, 15, 17, 19, 20]);
    }

    #[test]
    fn test_finite_segments_split_on_nan() {
        let segs = finite_segments(&[1.0, f32::NAN, 0.5, 0.4]);
        assert_eq!(segs, vec![vec![(1, 1.0)], vec![(3, 0.5), (4, 0.4)]]);
    }

    #[test]
    fn test_no_data() {
        let config = ChartConfig::default();
        assert!(matches!(render_loss_curves(&[], &[], &config), Err(RenderError::NoData)));
        assert!(matches!(
            render_loss_curves(&[f32::NAN], &[], &config),
            Err(RenderError::NoData)
        ));
    }

    #[test]
    fn test_tick_format() {
        assert_eq!(format_tick(0.5, 0.5), "0.5");
        assert_eq!(format_tick(2.0, 1.0), "2");
        assert_eq!(format_tick(0.25, 0.05), "0.25");
    }
}
