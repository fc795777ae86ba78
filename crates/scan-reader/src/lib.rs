//! Wind-field scan loading.
//!
//! Scans live in a dataset directory and are addressed by the file name stored
//! in the event table. Two encodings are understood:
//!
//! - **NetCDF** (`.nc`): the satellite product as delivered, with 2-D
//!   variables `lon`, `lat`, `wind_speed`, `wind_dir` and `wvc_index`.
//!   Requires the `netcdf` feature (and libnetcdf/libhdf5 on the system).
//! - **JSON** (`.json`): a serialized [`WindGrid`], used for fixtures and for
//!   machines without the native libraries.

pub mod error;
#[cfg(feature = "netcdf")]
pub mod native;

use std::fs;
use std::path::{Path, PathBuf};

use ring_common::WindGrid;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use error::{ScanError, ScanResult};

/// On-disk encoding of a scan, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanFormat {
    NetCdf,
    Json,
}

impl ScanFormat {
    /// Detect the format from a file name.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "nc" | "nc4" | "netcdf" => Some(ScanFormat::NetCdf),
            "json" => Some(ScanFormat::Json),
            _ => None,
        }
    }
}

/// A directory of per-event scan files.
#[derive(Debug, Clone)]
pub struct ScanStore {
    root: PathBuf,
}

impl ScanStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a scan file.
    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Load the scan stored under `file_name`.
    pub fn load(&self, file_name: &str) -> ScanResult<WindGrid> {
        let path = self.path_of(file_name);
        if !path.exists() {
            return Err(ScanError::NotFound(path.display().to_string()));
        }
        let grid = load_scan(&path)?;
        debug!(
            file = %file_name,
            rows = grid.rows,
            cols = grid.cols,
            "Loaded scan"
        );
        Ok(grid)
    }
}

/// Load a scan from an explicit path.
pub fn load_scan<P: AsRef<Path>>(path: P) -> ScanResult<WindGrid> {
    let path = path.as_ref();
    let name = path.to_string_lossy();
    match ScanFormat::from_file_name(&name) {
        Some(ScanFormat::Json) => load_json(path),
        Some(ScanFormat::NetCdf) => load_netcdf(path),
        None => Err(ScanError::UnsupportedFormat(name.into_owned())),
    }
}

/// Read a JSON-encoded scan.
pub fn load_json<P: AsRef<Path>>(path: P) -> ScanResult<WindGrid> {
    let bytes = fs::read(path)?;
    let encoded: JsonGrid = serde_json::from_slice(&bytes)?;
    encoded.into_grid()
}

/// Write a scan as JSON.
///
/// NaN is not representable in JSON, so missing values are written as `null`
/// and read back as NaN.
pub fn save_json<P: AsRef<Path>>(grid: &WindGrid, path: P) -> ScanResult<()> {
    let encoded = serde_json::to_vec(&JsonGrid::from(grid))?;
    fs::write(path, encoded)?;
    Ok(())
}

#[cfg(feature = "netcdf")]
fn load_netcdf(path: &Path) -> ScanResult<WindGrid> {
    native::read_scan(path)
}

#[cfg(not(feature = "netcdf"))]
fn load_netcdf(path: &Path) -> ScanResult<WindGrid> {
    Err(ScanError::UnsupportedFormat(format!(
        "{} (built without the `netcdf` feature)",
        path.display()
    )))
}

/// JSON layout of a scan; `null` stands for NaN.
#[derive(Serialize, Deserialize)]
struct JsonGrid {
    rows: usize,
    cols: usize,
    lon: Vec<Option<f32>>,
    lat: Vec<Option<f32>>,
    wind_speed: Vec<Option<f32>>,
    wind_dir: Vec<Option<f32>>,
    wvc_index: Vec<Option<f32>>,
}

impl JsonGrid {
    fn into_grid(self) -> ScanResult<WindGrid> {
        let nan = |values: Vec<Option<f32>>| -> Vec<f32> {
            values.into_iter().map(|v| v.unwrap_or(f32::NAN)).collect()
        };
        Ok(WindGrid::new(
            self.rows,
            self.cols,
            nan(self.lon),
            nan(self.lat),
            nan(self.wind_speed),
            nan(self.wind_dir),
            nan(self.wvc_index),
        )?)
    }
}

impl From<&WindGrid> for JsonGrid {
    fn from(grid: &WindGrid) -> Self {
        let opt = |values: &[f32]| -> Vec<Option<f32>> {
            values.iter().map(|v| (!v.is_nan()).then_some(*v)).collect()
        };
        Self {
            rows: grid.rows,
            cols: grid.cols,
            lon: opt(&grid.lon),
            lat: opt(&grid.lat),
            wind_speed: opt(&grid.wind_speed),
            wind_dir: opt(&grid.wind_dir),
            wvc_index: opt(&grid.wvc_index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(ScanFormat::from_file_name("a.nc"), Some(ScanFormat::NetCdf));
        assert_eq!(ScanFormat::from_file_name("a.NC"), Some(ScanFormat::NetCdf));
        assert_eq!(ScanFormat::from_file_name("dir/a.json"), Some(ScanFormat::Json));
        assert_eq!(ScanFormat::from_file_name("a.txt"), None);
        assert_eq!(ScanFormat::from_file_name("noext"), None);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScanStore::new(dir.path());
        assert!(matches!(store.load("nope.json"), Err(ScanError::NotFound(_))));
    }

    #[cfg(not(feature = "netcdf"))]
    #[test]
    fn test_netcdf_without_feature() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.nc");
        std::fs::write(&path, b"CDF").unwrap();
        assert!(matches!(
            load_scan(&path),
            Err(ScanError::UnsupportedFormat(_))
        ));
    }
}
