//! Colour handling: RGBA colours, the turbo colour map and discrete
//! boundary-based colour scales.

use std::fmt;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const PURPLE: Color = Color::rgb(128, 0, 128);
    pub const GRID: Color = Color::rgb(176, 176, 176);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rrggbb` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Self::rgb(r, g, b))
    }
}

/// Formats as `#rrggbb`, the form SVG attributes take.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The turbo colour map at `t` in `[0, 1]`.
///
/// Uses the published degree-5 polynomial fit, accurate to a few units per
/// channel.
pub fn turbo(t: f32) -> Color {
    let t = t.clamp(0.0, 1.0) as f64;
    let poly = |c: [f64; 6]| {
        let v = c[0] + t * (c[1] + t * (c[2] + t * (c[3] + t * (c[4] + t * c[5]))));
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    };

    Color::rgb(
        poly([
            0.135_721_38,
            4.615_392_6,
            -42.660_322_58,
            132.131_082_34,
            -152.942_393_96,
            59.286_379_43,
        ]),
        poly([
            0.091_402_61,
            2.194_188_39,
            4.842_966_58,
            -14.185_033_33,
            4.277_298_57,
            2.829_566_04,
        ]),
        poly([
            0.106_673_3,
            12.641_946_08,
            -60.582_048_36,
            110.362_767_71,
            -89.903_109_12,
            27.348_249_73,
        ]),
    )
}

/// A colour scale with one flat colour per interval between boundaries.
///
/// Interval `i` of `n` takes `turbo(i / (n - 1))`. Values below the first
/// boundary use the first colour, values at or above the last use the last.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteColormap {
    boundaries: Vec<f32>,
    colors: Vec<Color>,
}

impl DiscreteColormap {
    /// Build from ascending boundaries (at least two).
    pub fn turbo(boundaries: Vec<f32>) -> Option<Self> {
        if boundaries.len() < 2 || boundaries.windows(2).any(|w| w[0] >= w[1]) {
            return None;
        }
        Some(Self::sampled(boundaries))
    }

    /// Wind speed scale: 0 to 32.5 m/s in 2.5 m/s steps.
    pub fn wind_speed() -> Self {
        Self::sampled((0..=13).map(|i| i as f32 * 2.5).collect())
    }

    fn sampled(boundaries: Vec<f32>) -> Self {
        let bins = boundaries.len() - 1;
        let colors = (0..bins)
            .map(|i| {
                let t = if bins == 1 {
                    0.5
                } else {
                    i as f32 / (bins - 1) as f32
                };
                turbo(t)
            })
            .collect();

        Self { boundaries, colors }
    }

    pub fn boundaries(&self) -> &[f32] {
        &self.boundaries
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Index of the interval containing `value`.
    pub fn bin(&self, value: f32) -> usize {
        let upper = self.boundaries[1..]
            .iter()
            .position(|&b| value < b)
            .unwrap_or(self.colors.len() - 1);
        upper.min(self.colors.len() - 1)
    }

    pub fn color_for(&self, value: f32) -> Color {
        self.colors[self.bin(value)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let c = Color::from_hex("#1f77b4").unwrap();
        assert_eq!(c, Color::rgb(0x1f, 0x77, 0xb4));
        assert_eq!(c.to_string(), "#1f77b4");
        assert!(Color::from_hex("#fff").is_none());
    }

    #[test]
    fn test_turbo_ends() {
        // Near-black at 0, dark red at 1.
        let lo = turbo(0.0);
        assert!(lo.r < 80 && lo.g < 80 && lo.b < 80);
        let hi = turbo(1.0);
        assert!(hi.r > hi.g && hi.r > hi.b);
        // Green-ish in the middle.
        let mid = turbo(0.5);
        assert!(mid.g > mid.b);
    }

    #[test]
    fn test_wind_speed_bins() {
        let cmap = DiscreteColormap::wind_speed();
        assert_eq!(cmap.boundaries().len(), 14);
        assert_eq!(cmap.colors().len(), 13);
        assert_eq!(cmap.bin(-1.0), 0);
        assert_eq!(cmap.bin(0.0), 0);
        assert_eq!(cmap.bin(2.49), 0);
        assert_eq!(cmap.bin(2.5), 1);
        assert_eq!(cmap.bin(32.4), 12);
        assert_eq!(cmap.bin(50.0), 12);
    }

    #[test]
    fn test_rejects_unsorted_boundaries() {
        assert!(DiscreteColormap::turbo(vec![0.0]).is_none());
        assert!(DiscreteColormap::turbo(vec![1.0, 1.0]).is_none());
    }
}
