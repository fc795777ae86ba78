//! Native NetCDF scan reading using the netcdf library.
//!
//! Scatterometer scans are stored as 2-D variables over (row, cell)
//! dimensions. Packed integer variables are unpacked with their
//! `scale_factor`/`add_offset` attributes and fill values become NaN.

use std::path::Path;
use std::sync::Once;

use ring_common::WindGrid;
use tracing::debug;

use crate::error::{ScanError, ScanResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// HDF5 prints diagnostics for attribute lookups that fail even when the
/// failure is handled (optional `scale_factor` and friends). Safe to call
/// more than once.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and null handlers are a
        // documented way to disable error output.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Read a scan from a NetCDF file.
pub fn read_scan(path: &Path) -> ScanResult<WindGrid> {
    silence_hdf5_errors();

    let file = netcdf::open(path)
        .map_err(|e| ScanError::InvalidFormat(format!("Failed to open NetCDF: {}", e)))?;

    let speed_var = file
        .variable("wind_speed")
        .ok_or_else(|| ScanError::MissingData("wind_speed variable".to_string()))?;
    let dims = speed_var.dimensions();
    if dims.len() != 2 {
        return Err(ScanError::InvalidFormat(format!(
            "wind_speed has {} dimensions, expected 2",
            dims.len()
        )));
    }
    let rows = dims[0].len();
    let cols = dims[1].len();

    let grid = WindGrid::new(
        rows,
        cols,
        read_variable(&file, "lon")?,
        read_variable(&file, "lat")?,
        read_variable(&file, "wind_speed")?,
        read_variable(&file, "wind_dir")?,
        read_variable(&file, "wvc_index")?,
    )?;

    debug!(path = %path.display(), rows, cols, "Read NetCDF scan");
    Ok(grid)
}

fn read_variable(file: &netcdf::File, name: &str) -> ScanResult<Vec<f32>> {
    let var = file
        .variable(name)
        .ok_or_else(|| ScanError::MissingData(format!("{} variable", name)))?;
    read_unpacked(&var, name)
}

/// Read a variable as f32 with packing and fill values applied.
fn read_unpacked(var: &netcdf::Variable, name: &str) -> ScanResult<Vec<f32>> {
    let raw: Vec<f32> = var
        .get_values(..)
        .map_err(|e| ScanError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;

    let scale_factor = get_f32_attr(var, "scale_factor").unwrap_or(1.0);
    let add_offset = get_f32_attr(var, "add_offset").unwrap_or(0.0);
    let fill_value = get_f32_attr(var, "_FillValue").or_else(|| get_f32_attr(var, "missing_value"));

    Ok(raw
        .into_iter()
        .map(|val| match fill_value {
            Some(fill) if val == fill => f32::NAN,
            _ => val * scale_factor + add_offset,
        })
        .collect())
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get f32 attribute.
fn get_f32_attr(var: &netcdf::Variable, name: &str) -> Option<f32> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f32::try_from(attr_value).ok()
}
