//! A small SVG scene builder rasterized with resvg.
//!
//! Plots are assembled as SVG elements in pixel coordinates, then rendered
//! onto a white tiny-skia pixmap and encoded with [`crate::png::create_png`].
//! Text uses the system fonts; on a system without fonts labels are simply
//! not drawn.

use std::fmt::Write;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::colormap::Color;
use crate::error::{RenderError, RenderResult};
use crate::png::create_png;

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// An SVG document under construction.
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    width: u32,
    height: u32,
    body: String,
}

impl SvgCanvas {
    /// A canvas with a white background.
    pub fn new(width: u32, height: u32) -> Self {
        let mut canvas = Self {
            width,
            height,
            body: String::new(),
        };
        canvas.rect(0.0, 0.0, width as f32, height as f32, Color::WHITE, None);
        canvas
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: Color,
        stroke: Option<(Color, f32)>,
    ) {
        let _ = write!(
            self.body,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}""#,
            x, y, w, h, fill
        );
        match stroke {
            Some((color, width)) => {
                let _ = write!(self.body, r#" stroke="{}" stroke-width="{:.2}"/>"#, color, width);
            }
            None => self.body.push_str("/>"),
        }
    }

    /// Rectangle outline without fill.
    pub fn outline(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, width: f32) {
        let _ = write!(
            self.body,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="{}" stroke-width="{:.2}"/>"#,
            x, y, w, h, color, width
        );
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Color, width: f32) {
        let _ = write!(
            self.body,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.2}" stroke-linecap="round"/>"#,
            x1, y1, x2, y2, color, width
        );
    }

    pub fn dashed_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Color, width: f32) {
        let _ = write!(
            self.body,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.2}" stroke-dasharray="4 3"/>"#,
            x1, y1, x2, y2, color, width
        );
    }

    pub fn polyline(&mut self, points: &[(f32, f32)], color: Color, width: f32) {
        if points.is_empty() {
            return;
        }
        let _ = write!(
            self.body,
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{:.2}" stroke-linejoin="round"/>"#,
            point_list(points),
            color,
            width
        );
    }

    pub fn polygon(&mut self, points: &[(f32, f32)], fill: Color) {
        if points.is_empty() {
            return;
        }
        let _ = write!(
            self.body,
            r#"<polygon points="{}" fill="{}"/>"#,
            point_list(points),
            fill
        );
    }

    pub fn circle(&mut self, cx: f32, cy: f32, r: f32, fill: Color) {
        let _ = write!(
            self.body,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}"/>"#,
            cx, cy, r, fill
        );
    }

    /// An `x` marker of half-size `size` centred on (`cx`, `cy`).
    pub fn cross(&mut self, cx: f32, cy: f32, size: f32, color: Color, width: f32) {
        self.line(cx - size, cy - size, cx + size, cy + size, color, width);
        self.line(cx - size, cy + size, cx + size, cy - size, color, width);
    }

    /// Text with its baseline at `y`.
    pub fn text(&mut self, x: f32, y: f32, content: &str, size: f32, anchor: Anchor, color: Color) {
        let _ = write!(
            self.body,
            r#"<text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="{:.1}" text-anchor="{}" fill="{}">{}</text>"#,
            x,
            y,
            size,
            anchor.as_str(),
            color,
            escape(content)
        );
    }

    /// Text rotated 90° counter-clockwise around (`x`, `y`).
    pub fn vertical_text(&mut self, x: f32, y: f32, content: &str, size: f32, color: Color) {
        let _ = write!(
            self.body,
            r#"<text x="{:.2}" y="{:.2}" transform="rotate(-90 {:.2} {:.2})" font-family="sans-serif" font-size="{:.1}" text-anchor="middle" fill="{}">{}</text>"#,
            x,
            y,
            x,
            y,
            size,
            color,
            escape(content)
        );
    }

    /// The complete SVG document.
    pub fn document(&self) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">{body}</svg>"#,
            w = self.width,
            h = self.height,
            body = self.body
        )
    }

    /// Rasterize to an RGBA pixmap.
    pub fn rasterize(&self) -> RenderResult<tiny_skia::Pixmap> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }

        let mut opt = usvg::Options::default();
        opt.fontdb = fonts();

        let tree = usvg::Tree::from_str(&self.document(), &opt)
            .map_err(|e| RenderError::Svg(e.to_string()))?;

        let mut pixmap = tiny_skia::Pixmap::new(self.width, self.height).ok_or(
            RenderError::InvalidSize {
                width: self.width,
                height: self.height,
            },
        )?;
        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
        Ok(pixmap)
    }

    /// Rasterize and encode as PNG.
    pub fn render_png(&self) -> RenderResult<Vec<u8>> {
        let pixmap = self.rasterize()?;
        // The white background makes every pixel opaque, so premultiplied
        // and straight alpha coincide.
        create_png(pixmap.data(), self.width as usize, self.height as usize)
    }
}

/// System fonts, loaded once per process.
fn fonts() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            debug!(faces = db.len(), "Loaded system fonts");
            Arc::new(db)
        })
        .clone()
}

fn point_list(points: &[(f32, f32)]) -> String {
    let mut out = String::with_capacity(points.len() * 14);
    for (i, (x, y)) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:.2},{:.2}", x, y);
    }
    out
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
