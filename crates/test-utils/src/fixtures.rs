//! Common event-table fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use ring_common::{EventRecord, EventTable, Label};

/// File name of the table written by [`write_event_table`].
pub const TABLE_FILE_NAME: &str = "annotations_SS.txt";

/// Builds a record whose scan file is named after the cyclone id.
pub fn record(cyclone_id: u32, lon: f64, lat: f64, label: Label) -> EventRecord {
    EventRecord::new(cyclone_id, scan_file_name(cyclone_id), lon, lat, label)
}

/// Scan file name used by fixtures for a cyclone id.
pub fn scan_file_name(cyclone_id: u32) -> String {
    format!("scan_{}.json", cyclone_id)
}

/// Writes a table of `records` into `dir` and returns its path.
pub fn write_event_table(dir: &Path, records: Vec<EventRecord>) -> PathBuf {
    let path = dir.join(TABLE_FILE_NAME);
    fs::write(&path, EventTable::new(records).to_tsv_string())
        .unwrap_or_else(|e| panic!("failed to write fixture table {}: {}", path.display(), e));
    path
}

/// A fresh scratch directory.
pub fn scratch_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap_or_else(|e| panic!("failed to create temp dir: {}", e))
}
