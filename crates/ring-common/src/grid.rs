//! Wind-field scans as 2-D grids.
//!
//! A scan is a swath of wind-vector cells. Every variable is stored row-major
//! with the same `rows × cols` shape: row `r`, column `c` lives at
//! `r * cols + c`. Rows run along the satellite track, columns across it.
//!
//! Missing values are NaN. `wvc_index` is the validity indicator: a NaN there
//! means no wind-vector cell was retrieved (land, or outside the swath).

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{GeoPoint, RingError, RingResult};

/// A satellite wind-field scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindGrid {
    pub rows: usize,
    pub cols: usize,
    /// Cell longitude (degrees)
    pub lon: Vec<f32>,
    /// Cell latitude (degrees)
    pub lat: Vec<f32>,
    /// Wind speed (m/s)
    pub wind_speed: Vec<f32>,
    /// Direction the wind blows towards, clockwise from north (degrees)
    pub wind_dir: Vec<f32>,
    /// Wind-vector-cell index; NaN where no cell exists
    pub wvc_index: Vec<f32>,
}

impl WindGrid {
    /// Create a grid, checking that every variable has `rows * cols` values.
    pub fn new(
        rows: usize,
        cols: usize,
        lon: Vec<f32>,
        lat: Vec<f32>,
        wind_speed: Vec<f32>,
        wind_dir: Vec<f32>,
        wvc_index: Vec<f32>,
    ) -> RingResult<Self> {
        let grid = Self {
            rows,
            cols,
            lon,
            lat,
            wind_speed,
            wind_dir,
            wvc_index,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Check variable lengths against the declared shape.
    pub fn validate(&self) -> RingResult<()> {
        let expected = self.rows * self.cols;
        for (name, values) in self.variables() {
            if values.len() != expected {
                return Err(RingError::ShapeMismatch {
                    name: name.to_string(),
                    expected,
                    found: values.len(),
                });
            }
        }
        Ok(())
    }

    fn variables(&self) -> [(&'static str, &Vec<f32>); 5] {
        [
            ("lon", &self.lon),
            ("lat", &self.lat),
            ("wind_speed", &self.wind_speed),
            ("wind_dir", &self.wind_dir),
            ("wvc_index", &self.wvc_index),
        ]
    }

    /// Flat index of a cell.
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Coordinates of a cell.
    pub fn point(&self, row: usize, col: usize) -> GeoPoint {
        let idx = self.index(row, col);
        GeoPoint::new(self.lon[idx] as f64, self.lat[idx] as f64)
    }

    /// True when the cell has a wind-vector cell index.
    pub fn is_valid_cell(&self, row: usize, col: usize) -> bool {
        !self.wvc_index[self.index(row, col)].is_nan()
    }

    /// True when at least one cell of the row is valid.
    pub fn row_has_data(&self, row: usize) -> bool {
        (0..self.cols).any(|c| self.is_valid_cell(row, c))
    }

    /// True when at least one cell of the column is valid.
    pub fn col_has_data(&self, col: usize) -> bool {
        (0..self.rows).any(|r| self.is_valid_cell(r, col))
    }

    /// U/V components of the cell's wind vector.
    ///
    /// U = speed · sin(dir), V = speed · cos(dir), with the direction in
    /// degrees clockwise from north. NaN in either input propagates.
    pub fn uv(&self, row: usize, col: usize) -> (f32, f32) {
        let idx = self.index(row, col);
        speed_dir_to_uv(self.wind_speed[idx], self.wind_dir[idx])
    }

    /// U component for every cell (row-major).
    pub fn u_component(&self) -> Vec<f32> {
        self.wind_speed
            .iter()
            .zip(&self.wind_dir)
            .map(|(&s, &d)| speed_dir_to_uv(s, d).0)
            .collect()
    }

    /// V component for every cell (row-major).
    pub fn v_component(&self) -> Vec<f32> {
        self.wind_speed
            .iter()
            .zip(&self.wind_dir)
            .map(|(&s, &d)| speed_dir_to_uv(s, d).1)
            .collect()
    }

    /// Copy out a rectangular block of the grid.
    ///
    /// Ranges are clamped to the grid shape.
    pub fn subgrid(&self, rows: Range<usize>, cols: Range<usize>) -> WindGrid {
        let rows = rows.start.min(self.rows)..rows.end.min(self.rows);
        let cols = cols.start.min(self.cols)..cols.end.min(self.cols);
        let n_rows = rows.len();
        let n_cols = cols.len();

        let copy = |values: &[f32]| -> Vec<f32> {
            let mut out = Vec::with_capacity(n_rows * n_cols);
            for r in rows.clone() {
                let start = r * self.cols;
                out.extend_from_slice(&values[start + cols.start..start + cols.end]);
            }
            out
        };

        WindGrid {
            rows: n_rows,
            cols: n_cols,
            lon: copy(&self.lon),
            lat: copy(&self.lat),
            wind_speed: copy(&self.wind_speed),
            wind_dir: copy(&self.wind_dir),
            wvc_index: copy(&self.wvc_index),
        }
    }
}

/// Convert speed and direction (degrees clockwise from north) to U/V.
pub fn speed_dir_to_uv(speed: f32, dir_deg: f32) -> (f32, f32) {
    let rad = dir_deg.to_radians();
    (speed * rad.sin(), speed * rad.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_grid() -> WindGrid {
        // 2 rows x 3 cols
        WindGrid::new(
            2,
            3,
            vec![10.0, 10.5, 11.0, 10.0, 10.5, 11.0],
            vec![40.0, 40.0, 40.0, 39.5, 39.5, 39.5],
            vec![5.0, 10.0, f32::NAN, 2.0, 0.0, 8.0],
            vec![0.0, 90.0, 0.0, 180.0, 45.0, 270.0],
            vec![1.0, 2.0, f32::NAN, 4.0, 5.0, 6.0],
        )
        .unwrap()
    }

    #[test]
    fn test_shape_mismatch() {
        let err = WindGrid::new(
            2,
            2,
            vec![0.0; 4],
            vec![0.0; 4],
            vec![0.0; 3],
            vec![0.0; 4],
            vec![0.0; 4],
        )
        .unwrap_err();
        assert!(matches!(err, RingError::ShapeMismatch { expected: 4, found: 3, .. }));
    }

    #[test]
    fn test_uv_components() {
        let grid = tiny_grid();

        let (u, v) = grid.uv(0, 0);
        assert!(u.abs() < 1e-5 && (v - 5.0).abs() < 1e-5);

        let (u, v) = grid.uv(0, 1);
        assert!((u - 10.0).abs() < 1e-5 && v.abs() < 1e-4);

        let (u, v) = grid.uv(1, 0);
        assert!(u.abs() < 1e-5 && (v + 2.0).abs() < 1e-5);

        let (u, v) = grid.uv(0, 2);
        assert!(u.is_nan() && v.is_nan());
    }

    #[test]
    fn test_validity() {
        let grid = tiny_grid();
        assert!(grid.is_valid_cell(0, 0));
        assert!(!grid.is_valid_cell(0, 2));
        assert!(grid.col_has_data(2));
        assert!(grid.row_has_data(0));
    }

    #[test]
    fn test_subgrid() {
        let grid = tiny_grid();
        let sub = grid.subgrid(1..2, 1..3);
        assert_eq!(sub.rows, 1);
        assert_eq!(sub.cols, 2);
        assert_eq!(sub.wind_speed, vec![0.0, 8.0]);
        assert_eq!(sub.lat, vec![39.5, 39.5]);
        sub.validate().unwrap();
    }

    #[test]
    fn test_subgrid_clamps() {
        let grid = tiny_grid();
        let sub = grid.subgrid(0..10, 2..10);
        assert_eq!((sub.rows, sub.cols), (2, 1));
    }
}
