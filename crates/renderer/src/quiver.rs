//! Wind arrow ("quiver") plots of a single scan.
//!
//! The plot is a plate carrée map of the view: longitude and latitude map
//! linearly to pixels with equal scale on both axes. Every valid cell inside
//! the view gets an arrow centred on the cell, pointing where the wind blows
//! and coloured by speed. Overlays:
//!
//! - black `x` at the storm centre
//! - purple `x` at the highest-speed cells
//! - 1° gridlines labeled on the left and bottom
//! - a colour bar for the speed scale

use ring_common::{GeoPoint, WindGrid};
use tracing::debug;

use crate::colormap::{Color, DiscreteColormap};
use crate::error::{RenderError, RenderResult};
use crate::svg::{Anchor, SvgCanvas};

/// Map area margins in pixels: left, right, top, bottom.
const MARGINS: (f32, f32, f32, f32) = (70.0, 120.0, 50.0, 50.0);

/// Geographic extent of a plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanView {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
    /// Storm centre, marked on the plot
    pub center: GeoPoint,
}

impl ScanView {
    /// A view of `window_size` degrees on each side of `center`, with the
    /// edges rounded to whole degrees.
    ///
    /// An extent that rounds to zero width becomes the whole degree
    /// containing the centre.
    pub fn around(center: GeoPoint, window_size: f64) -> Self {
        let (west, east) = rounded_extent(center.lon, window_size);
        let (south, north) = rounded_extent(center.lat, window_size);
        Self {
            west,
            east,
            south,
            north,
            center,
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lon >= self.west
            && point.lon <= self.east
            && point.lat >= self.south
            && point.lat <= self.north
    }

    pub fn width_deg(&self) -> f64 {
        self.east - self.west
    }

    pub fn height_deg(&self) -> f64 {
        self.north - self.south
    }
}

fn rounded_extent(mid: f64, half_width: f64) -> (f64, f64) {
    let lo = (mid - half_width).round();
    let hi = (mid + half_width).round();
    if hi > lo {
        (lo, hi)
    } else {
        let lo = mid.floor();
        (lo, lo + 1.0)
    }
}

/// Configuration for quiver rendering
#[derive(Debug, Clone)]
pub struct QuiverConfig {
    /// Image width in pixels (default: 960)
    pub width: u32,
    /// Image height in pixels (default: 720)
    pub height: u32,
    /// Speed (m/s) drawn as an arrow as long as the map is wide
    pub arrow_scale: f32,
    /// Colour scale for arrow speed
    pub colormap: DiscreteColormap,
    /// Number of highest-speed cells to mark
    pub top_n: usize,
    /// Title above the map, usually the scan file name
    pub title: Option<String>,
}

impl Default for QuiverConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 720,
            arrow_scale: 500.0,
            colormap: DiscreteColormap::wind_speed(),
            top_n: 5,
            title: None,
        }
    }
}

/// A grid cell ranked by wind speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedPoint {
    pub row: usize,
    pub col: usize,
    pub point: GeoPoint,
    pub speed: f32,
}

/// The `n` cells with the highest wind speed, fastest first.
///
/// Cells without a speed never rank. Ties keep grid order.
pub fn top_speed_points(grid: &WindGrid, n: usize) -> Vec<SpeedPoint> {
    let mut ranked: Vec<(usize, f32)> = grid
        .wind_speed
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, s)| s.is_finite())
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .take(n)
        .map(|(idx, speed)| {
            let (row, col) = (idx / grid.cols, idx % grid.cols);
            SpeedPoint {
                row,
                col,
                point: grid.point(row, col),
                speed,
            }
        })
        .collect()
}

/// Pixel mapping for the map area.
#[derive(Debug, Clone, Copy)]
struct MapFrame {
    view: ScanView,
    /// Pixels per degree
    scale: f64,
    x0: f64,
    y0: f64,
    width: f64,
    height: f64,
}

impl MapFrame {
    fn fit(view: ScanView, canvas_w: u32, canvas_h: u32) -> RenderResult<Self> {
        let (left, right, top, bottom) = MARGINS;
        let avail_w = canvas_w as f64 - (left + right) as f64;
        let avail_h = canvas_h as f64 - (top + bottom) as f64;
        if avail_w <= 0.0 || avail_h <= 0.0 {
            return Err(RenderError::InvalidSize {
                width: canvas_w,
                height: canvas_h,
            });
        }

        let scale = (avail_w / view.width_deg()).min(avail_h / view.height_deg());
        let width = view.width_deg() * scale;
        let height = view.height_deg() * scale;

        Ok(Self {
            view,
            scale,
            x0: left as f64 + (avail_w - width) / 2.0,
            y0: top as f64 + (avail_h - height) / 2.0,
            width,
            height,
        })
    }

    fn to_px(&self, p: GeoPoint) -> (f32, f32) {
        (
            (self.x0 + (p.lon - self.view.west) * self.scale) as f32,
            (self.y0 + (self.view.north - p.lat) * self.scale) as f32,
        )
    }

    fn right(&self) -> f32 {
        (self.x0 + self.width) as f32
    }

    fn bottom(&self) -> f32 {
        (self.y0 + self.height) as f32
    }
}

/// Render `grid` inside `view` as a PNG.
pub fn render_scan(
    grid: &WindGrid,
    view: &ScanView,
    config: &QuiverConfig,
) -> RenderResult<Vec<u8>> {
    let (width, height) = (view.width_deg(), view.height_deg());
    if width.is_nan() || height.is_nan() || width <= 0.0 || height <= 0.0 {
        return Err(RenderError::EmptyView(format!(
            "lon {}..{}, lat {}..{}",
            view.west, view.east, view.south, view.north
        )));
    }

    let frame = MapFrame::fit(*view, config.width, config.height)?;
    let mut canvas = SvgCanvas::new(config.width, config.height);

    draw_gridlines(&mut canvas, &frame);
    let arrows = draw_arrows(&mut canvas, &frame, grid, config);

    for p in top_speed_points(grid, config.top_n) {
        if view.contains(p.point) {
            let (x, y) = frame.to_px(p.point);
            canvas.cross(x, y, 6.0, Color::PURPLE, 2.0);
        }
    }
    if view.center.is_finite() {
        let (x, y) = frame.to_px(view.center);
        canvas.cross(x, y, 7.0, Color::BLACK, 2.5);
    }

    canvas.outline(
        frame.x0 as f32,
        frame.y0 as f32,
        frame.width as f32,
        frame.height as f32,
        Color::BLACK,
        1.0,
    );
    draw_colorbar(&mut canvas, &frame, &config.colormap);

    if let Some(title) = &config.title {
        canvas.text(
            config.width as f32 / 2.0,
            28.0,
            title,
            18.0,
            Anchor::Middle,
            Color::BLACK,
        );
    }

    debug!(arrows, width = config.width, height = config.height, "Rendered quiver plot");
    canvas.render_png()
}

/// Draw one arrow per valid cell in view. Returns the number drawn.
fn draw_arrows(
    canvas: &mut SvgCanvas,
    frame: &MapFrame,
    grid: &WindGrid,
    config: &QuiverConfig,
) -> usize {
    let px_per_speed = frame.width as f32 / config.arrow_scale;
    let mut drawn = 0;

    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let point = grid.point(row, col);
            if !point.is_finite() || !frame.view.contains(point) {
                continue;
            }
            let speed = grid.wind_speed[grid.index(row, col)];
            let (u, v) = grid.uv(row, col);
            if !speed.is_finite() || !u.is_finite() || !v.is_finite() {
                continue;
            }

            let (cx, cy) = frame.to_px(point);
            let color = config.colormap.color_for(speed);
            draw_arrow(canvas, cx, cy, u * px_per_speed, -v * px_per_speed, color);
            drawn += 1;
        }
    }

    drawn
}

/// Arrow of pixel vector (`dx`, `dy`) pivoting on its middle.
fn draw_arrow(canvas: &mut SvgCanvas, cx: f32, cy: f32, dx: f32, dy: f32, color: Color) {
    let len = (dx * dx + dy * dy).sqrt();
    if len < 0.5 {
        canvas.circle(cx, cy, 0.8, color);
        return;
    }

    let (ux, uy) = (dx / len, dy / len);
    let tail = (cx - dx / 2.0, cy - dy / 2.0);
    let tip = (cx + dx / 2.0, cy + dy / 2.0);

    let head_len = (len * 0.35).min(6.0);
    let head_half = head_len * 0.5;
    let base = (tip.0 - ux * head_len, tip.1 - uy * head_len);

    canvas.line(tail.0, tail.1, base.0, base.1, color, 1.2);
    canvas.polygon(
        &[
            tip,
            (base.0 - uy * head_half, base.1 + ux * head_half),
            (base.0 + uy * head_half, base.1 - ux * head_half),
        ],
        color,
    );
}

fn draw_gridlines(canvas: &mut SvgCanvas, frame: &MapFrame) {
    let view = frame.view;

    let mut lon = view.west.ceil();
    while lon <= view.east {
        let (x, _) = frame.to_px(GeoPoint::new(lon, view.north));
        canvas.dashed_line(x, frame.y0 as f32, x, frame.bottom(), Color::GRID, 0.8);
        canvas.text(x, frame.bottom() + 18.0, &lon_label(lon), 12.0, Anchor::Middle, Color::BLACK);
        lon += 1.0;
    }

    let mut lat = view.south.ceil();
    while lat <= view.north {
        let (_, y) = frame.to_px(GeoPoint::new(view.west, lat));
        canvas.dashed_line(frame.x0 as f32, y, frame.right(), y, Color::GRID, 0.8);
        canvas.text(
            frame.x0 as f32 - 6.0,
            y + 4.0,
            &lat_label(lat),
            12.0,
            Anchor::End,
            Color::BLACK,
        );
        lat += 1.0;
    }
}

fn draw_colorbar(canvas: &mut SvgCanvas, frame: &MapFrame, colormap: &DiscreteColormap) {
    let x = frame.right() + 24.0;
    let bar_w = 18.0;
    let top = frame.y0 as f32;
    let height = frame.height as f32;

    let colors = colormap.colors();
    let bin_h = height / colors.len() as f32;
    for (i, &color) in colors.iter().enumerate() {
        // Lowest bin at the bottom.
        let y = top + height - (i + 1) as f32 * bin_h;
        canvas.rect(x, y, bar_w, bin_h + 0.5, color, None);
    }
    canvas.outline(x, top, bar_w, height, Color::BLACK, 0.8);

    for (i, b) in colormap.boundaries().iter().enumerate() {
        let y = top + height - i as f32 * bin_h;
        canvas.line(x + bar_w, y, x + bar_w + 4.0, y, Color::BLACK, 0.8);
        canvas.text(x + bar_w + 7.0, y + 4.0, &format!("{}", b), 11.0, Anchor::Start, Color::BLACK);
    }
    canvas.vertical_text(
        x + bar_w + 62.0,
        top + height / 2.0,
        "Wind Speed (m/s)",
        13.0,
        Color::BLACK,
    );
}

fn lon_label(lon: f64) -> String {
    match lon {
        l if l > 0.0 => format!("{}°E", l),
        l if l < 0.0 => format!("{}°W", -l),
        _ => "0°".to_string(),
    }
}

fn lat_label(lat: f64) -> String {
    match lat {
        l if l > 0.0 => format!("{}°N", l),
        l if l < 0.0 => format!("{}°S", -l),
        _ => "0°".to_string(),
    }
}
