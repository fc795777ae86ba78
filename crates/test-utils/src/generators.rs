//! Test data generators for synthetic wind-field scans.
//!
//! Scans are laid out like a descending swath: row 0 is the northernmost
//! row, column 0 the westernmost. Cell spacing is 0.125° in both directions,
//! close to a 12.5 km scatterometer product.

use ring_common::WindGrid;

/// Cell spacing of generated scans (degrees).
pub const CELL_DEGREES: f64 = 0.125;

/// Peak wind speed of the generated vortex (m/s).
pub const VORTEX_MAX_SPEED: f32 = 30.0;

/// Radius of maximum wind of the generated vortex (degrees).
pub const VORTEX_RADIUS_DEGREES: f64 = 0.5;

/// Geographic placement of a generated scan.
#[derive(Debug, Clone, Copy)]
pub struct SwathSpec {
    pub rows: usize,
    pub cols: usize,
    /// Longitude of column 0
    pub west_lon: f64,
    /// Latitude of row 0
    pub north_lat: f64,
}

impl SwathSpec {
    pub fn new(rows: usize, cols: usize, west_lon: f64, north_lat: f64) -> Self {
        Self {
            rows,
            cols,
            west_lon,
            north_lat,
        }
    }

    /// The standard 161 × 82 swath shape over the central Mediterranean.
    pub fn mediterranean() -> Self {
        Self::new(161, 82, 10.0, 42.0)
    }

    /// Longitude of a column.
    pub fn lon_of(&self, col: usize) -> f64 {
        self.west_lon + col as f64 * CELL_DEGREES
    }

    /// Latitude of a row.
    pub fn lat_of(&self, row: usize) -> f64 {
        self.north_lat - row as f64 * CELL_DEGREES
    }
}

/// Creates a scan with a cyclonic vortex centred on cell (`center_row`, `center_col`).
///
/// Speed rises linearly to [`VORTEX_MAX_SPEED`] at [`VORTEX_RADIUS_DEGREES`]
/// and decays as 1/r outside it. Winds circulate counter-clockwise. Every cell
/// is valid; use [`with_missing_border`] to blank edges.
pub fn create_vortex_scan(spec: SwathSpec, center_row: usize, center_col: usize) -> WindGrid {
    let n = spec.rows * spec.cols;
    let mut lon = Vec::with_capacity(n);
    let mut lat = Vec::with_capacity(n);
    let mut speed = Vec::with_capacity(n);
    let mut dir = Vec::with_capacity(n);
    let mut wvc = Vec::with_capacity(n);

    let c_lon = spec.lon_of(center_col);
    let c_lat = spec.lat_of(center_row);

    for row in 0..spec.rows {
        for col in 0..spec.cols {
            let x = spec.lon_of(col);
            let y = spec.lat_of(row);
            let dx = x - c_lon;
            let dy = y - c_lat;
            let r = (dx * dx + dy * dy).sqrt();

            let s = if r < VORTEX_RADIUS_DEGREES {
                VORTEX_MAX_SPEED as f64 * r / VORTEX_RADIUS_DEGREES
            } else {
                VORTEX_MAX_SPEED as f64 * VORTEX_RADIUS_DEGREES / r
            };

            // Counter-clockwise tangent of (dx, dy) is (-dy, dx); bearing
            // clockwise from north is atan2(east, north).
            let bearing = (-dy).atan2(dx).to_degrees();
            let bearing = (bearing + 360.0) % 360.0;

            lon.push(x as f32);
            lat.push(y as f32);
            speed.push(s as f32);
            dir.push(bearing as f32);
            wvc.push((col + 1) as f32);
        }
    }

    WindGrid {
        rows: spec.rows,
        cols: spec.cols,
        lon,
        lat,
        wind_speed: speed,
        wind_dir: dir,
        wvc_index: wvc,
    }
}

/// Creates a scan with the same wind everywhere.
pub fn create_uniform_scan(spec: SwathSpec, speed: f32, dir_deg: f32) -> WindGrid {
    let mut grid = create_vortex_scan(spec, 0, 0);
    grid.wind_speed.iter_mut().for_each(|v| *v = speed);
    grid.wind_dir.iter_mut().for_each(|v| *v = dir_deg);
    grid
}

/// Blank the outermost rows and columns of a scan.
///
/// Wind and validity become NaN; coordinates are kept, as in real products
/// where geolocation exists for cells without a retrieval.
pub fn with_missing_border(
    mut grid: WindGrid,
    top: usize,
    bottom: usize,
    left: usize,
    right: usize,
) -> WindGrid {
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let blank = row < top
                || row + bottom >= grid.rows
                || col < left
                || col + right >= grid.cols;
            if blank {
                let idx = grid.index(row, col);
                grid.wind_speed[idx] = f32::NAN;
                grid.wind_dir[idx] = f32::NAN;
                grid.wvc_index[idx] = f32::NAN;
            }
        }
    }
    grid
}

/// Mark single cells as land (no retrieval).
pub fn with_land_cells(mut grid: WindGrid, cells: &[(usize, usize)]) -> WindGrid {
    for &(row, col) in cells {
        let idx = grid.index(row, col);
        grid.wind_speed[idx] = f32::NAN;
        grid.wind_dir[idx] = f32::NAN;
        grid.wvc_index[idx] = f32::NAN;
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vortex_shape_and_calm_eye() {
        let spec = SwathSpec::new(20, 10, 0.0, 10.0);
        let grid = create_vortex_scan(spec, 10, 5);
        grid.validate().unwrap();
        assert_eq!(grid.wind_speed[grid.index(10, 5)], 0.0);
        assert!(grid.wind_speed[grid.index(10, 9)] > 0.0);
    }

    #[test]
    fn test_missing_border() {
        let spec = SwathSpec::new(6, 6, 0.0, 10.0);
        let grid = with_missing_border(create_uniform_scan(spec, 5.0, 0.0), 1, 0, 0, 2);
        assert!(!grid.is_valid_cell(0, 2));
        assert!(grid.is_valid_cell(1, 3));
        assert!(!grid.is_valid_cell(3, 4));
        assert!(!grid.is_valid_cell(3, 5));
        assert!(!grid.wind_speed[grid.index(0, 0)].is_finite());
        assert!(grid.lon[grid.index(0, 0)].is_finite());
    }
}
