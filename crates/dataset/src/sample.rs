//! Model inputs and targets built from a cropped scan.

use ring_common::{haversine_km, EventRecord, GeoBox, GeoPoint, Label, WindGrid};
use serde::{Deserialize, Serialize};

use crate::window::Window;

/// Number of input channels: U, V and validity.
pub const INPUT_CHANNELS: usize = 3;

/// Value written in place of NaN before tensors reach a model.
pub const MISSING_SENTINEL: f32 = -1.0;

/// A dense (channel, height, width) tensor, row-major within each channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor3 {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
    pub data: Vec<f32>,
}

impl Tensor3 {
    /// Stack equally sized planes into channels.
    pub fn from_planes(height: usize, width: usize, planes: Vec<Vec<f32>>) -> Self {
        let channels = planes.len();
        let mut data = Vec::with_capacity(channels * height * width);
        for plane in planes {
            debug_assert_eq!(plane.len(), height * width);
            data.extend(plane);
        }
        Self {
            channels,
            height,
            width,
            data,
        }
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.channels, self.height, self.width)
    }

    /// Values of one channel.
    pub fn channel(&self, c: usize) -> &[f32] {
        let n = self.height * self.width;
        &self.data[c * n..(c + 1) * n]
    }

    pub fn channel_mut(&mut self, c: usize) -> &mut [f32] {
        let n = self.height * self.width;
        &mut self.data[c * n..(c + 1) * n]
    }

    pub fn get(&self, c: usize, row: usize, col: usize) -> f32 {
        self.data[(c * self.height + row) * self.width + col]
    }

    /// Replace every NaN with `value`.
    pub fn fill_nan(&mut self, value: f32) {
        for v in self.data.iter_mut().filter(|v| v.is_nan()) {
            *v = value;
        }
    }
}

/// Per-pixel class map: 0 background, `label + 1` near the storm centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationMask {
    pub height: usize,
    pub width: usize,
    pub classes: Vec<i64>,
}

impl SegmentationMask {
    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.classes[row * self.width + col]
    }

    /// Number of non-background pixels.
    pub fn foreground(&self) -> usize {
        self.classes.iter().filter(|&&c| c != 0).count()
    }
}

/// Object-detection target: boxes as `[x1, y1, x2, y2]` pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionTarget {
    pub boxes: Vec<[f32; 4]>,
    pub labels: Vec<i64>,
}

/// One training example.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Row of the event table this sample came from
    pub index: usize,
    pub file_name: String,
    pub label: Label,
    pub window: Window,
    pub data: Tensor3,
    pub mask: SegmentationMask,
    pub detection: DetectionTarget,
}

/// Crop `grid` to `window` and build the input tensor and both targets.
///
/// The record's label must be known; unknown labels map to class 0.
pub fn build_sample(
    index: usize,
    grid: &WindGrid,
    window: &Window,
    record: &EventRecord,
    radius_km: f64,
) -> Sample {
    let crop = grid.subgrid(window.rows.clone(), window.cols.clone());
    let center = record.center();
    let class = record.label.class_index().unwrap_or(0);

    Sample {
        index,
        file_name: record.file_name.clone(),
        label: record.label,
        window: window.clone(),
        data: input_tensor(&crop),
        mask: segmentation_mask(&crop, center, radius_km, class),
        detection: detection_target(&crop, center, radius_km, class),
    }
}

/// Stack U, V and the validity channel (1 where a wind speed exists).
pub fn input_tensor(crop: &WindGrid) -> Tensor3 {
    let validity = crop
        .wind_speed
        .iter()
        .map(|s| if s.is_nan() { 0.0 } else { 1.0 })
        .collect();
    Tensor3::from_planes(
        crop.rows,
        crop.cols,
        vec![crop.u_component(), crop.v_component(), validity],
    )
}

/// Cells within `radius_km` of `center` get `class + 1`, the rest 0.
pub fn segmentation_mask(
    crop: &WindGrid,
    center: GeoPoint,
    radius_km: f64,
    class: i64,
) -> SegmentationMask {
    let classes = crop
        .lon
        .iter()
        .zip(&crop.lat)
        .map(|(&lon, &lat)| {
            let p = GeoPoint::new(lon as f64, lat as f64);
            if p.is_finite() && haversine_km(center, p) <= radius_km {
                class + 1
            } else {
                0
            }
        })
        .collect();

    SegmentationMask {
        height: crop.rows,
        width: crop.cols,
        classes,
    }
}

/// Box around the circle of `radius_km`, snapped to the nearest crop cells.
pub fn detection_target(
    crop: &WindGrid,
    center: GeoPoint,
    radius_km: f64,
    class: i64,
) -> DetectionTarget {
    let geo_box = GeoBox::around(center, radius_km);
    let (r1, c1) = nearest_pixel(crop, geo_box.top_left());
    let (r2, c2) = nearest_pixel(crop, geo_box.bottom_right());

    DetectionTarget {
        boxes: vec![[
            c1.min(c2) as f32,
            r1.min(r2) as f32,
            c1.max(c2) as f32,
            r1.max(r2) as f32,
        ]],
        labels: vec![class],
    }
}

/// Pixel (row, col) of the crop cell nearest `point`.
fn nearest_pixel(crop: &WindGrid, point: GeoPoint) -> (usize, usize) {
    crate::window::nearest_cell(crop, point).unwrap_or((0, 0))
}
