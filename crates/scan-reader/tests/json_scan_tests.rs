//! Tests for loading scans from a dataset directory.

use scan_reader::{load_scan, save_json, ScanError, ScanStore};
use test_utils::{create_vortex_scan, scratch_dir, with_missing_border, SwathSpec};

#[test]
fn test_missing_values_survive_json() {
    let dir = scratch_dir();
    let grid = with_missing_border(
        create_vortex_scan(SwathSpec::new(12, 8, 14.0, 38.0), 6, 4),
        0,
        0,
        1,
        1,
    );
    save_json(&grid, dir.path().join("scan_1.json")).unwrap();

    let store = ScanStore::new(dir.path());
    let loaded = store.load("scan_1.json").unwrap();

    assert_eq!((loaded.rows, loaded.cols), (12, 8));
    assert!(!loaded.is_valid_cell(3, 0));
    assert!(!loaded.is_valid_cell(3, 7));
    assert!(loaded.wind_speed[loaded.index(3, 0)].is_nan());
    assert_eq!(loaded.lon, grid.lon);
    assert_eq!(
        loaded.wind_speed[loaded.index(2, 3)],
        grid.wind_speed[grid.index(2, 3)]
    );
}

#[test]
fn test_truncated_variable_is_rejected() {
    let dir = scratch_dir();
    let path = dir.path().join("broken.json");
    std::fs::write(
        &path,
        r#"{"rows":2,"cols":2,"lon":[0,1,0,1],"lat":[1,1,0,0],
            "wind_speed":[1,2,3],"wind_dir":[0,0,0,0],"wvc_index":[1,2,3,4]}"#,
    )
    .unwrap();

    match load_scan(&path) {
        Err(ScanError::InvalidFormat(msg)) => assert!(msg.contains("wind_speed")),
        other => panic!("expected InvalidFormat, got {:?}", other),
    }
}

#[test]
fn test_unknown_extension() {
    let dir = scratch_dir();
    let path = dir.path().join("scan.grib2");
    std::fs::write(&path, b"GRIB").unwrap();
    assert!(matches!(
        load_scan(&path),
        Err(ScanError::UnsupportedFormat(_))
    ));
}
