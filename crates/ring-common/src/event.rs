//! Candidate cyclone events and the tab-separated table they live in.
//!
//! The table is plain text, one header line followed by one line per event,
//! cells separated by a single tab. The columns this crate understands are
//! `cyclone_id`, `file_name`, `lon`, `lat`, `label` and the optional `slabel`
//! (a second, independent label used for quality control). Any other column is
//! carried through untouched so that a table can be read, relabeled and written
//! back without losing information.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::{GeoPoint, Label, RingError, RingResult};

pub const COL_CYCLONE_ID: &str = "cyclone_id";
pub const COL_FILE_NAME: &str = "file_name";
pub const COL_LON: &str = "lon";
pub const COL_LAT: &str = "lat";
pub const COL_LABEL: &str = "label";
pub const COL_SECONDARY_LABEL: &str = "slabel";

const REQUIRED_COLUMNS: [&str; 5] = [COL_CYCLONE_ID, COL_FILE_NAME, COL_LON, COL_LAT, COL_LABEL];

/// One candidate event: a scan file and the storm centre it was matched to.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub cyclone_id: u32,
    pub file_name: String,
    /// Storm centre longitude in degrees, NaN when missing
    pub lon: f64,
    /// Storm centre latitude in degrees, NaN when missing
    pub lat: f64,
    pub label: Label,
    /// Quality-control label from a second source
    pub secondary_label: Option<Label>,
    /// Columns this crate does not interpret, keyed by header name
    pub extra: BTreeMap<String, String>,
}

impl EventRecord {
    pub fn new(
        cyclone_id: u32,
        file_name: impl Into<String>,
        lon: f64,
        lat: f64,
        label: Label,
    ) -> Self {
        Self {
            cyclone_id,
            file_name: file_name.into(),
            lon,
            lat,
            label,
            secondary_label: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_secondary_label(mut self, label: Label) -> Self {
        self.secondary_label = Some(label);
        self
    }

    /// Storm centre as a geographic point.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.lon, self.lat)
    }

    /// True when both centre coordinates are finite.
    pub fn has_coordinates(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// True when a human has to look at this event again: the label is still
    /// unknown, or the two label sources disagree.
    pub fn needs_review(&self) -> bool {
        if self.label == Label::Unknown {
            return true;
        }
        matches!(self.secondary_label, Some(secondary) if secondary != self.label)
    }

    fn cell(&self, column: &str) -> String {
        match column {
            COL_CYCLONE_ID => self.cyclone_id.to_string(),
            COL_FILE_NAME => self.file_name.clone(),
            COL_LON => format_coordinate(self.lon),
            COL_LAT => format_coordinate(self.lat),
            COL_LABEL => self.label.to_string(),
            COL_SECONDARY_LABEL => self
                .secondary_label
                .map(|l| l.to_string())
                .unwrap_or_default(),
            other => self.extra.get(other).cloned().unwrap_or_default(),
        }
    }
}

/// An ordered table of events together with its header.
#[derive(Debug, Clone, PartialEq)]
pub struct EventTable {
    header: Vec<String>,
    records: Vec<EventRecord>,
}

impl EventTable {
    /// Build a table with the standard column set.
    pub fn new(records: Vec<EventRecord>) -> Self {
        let header = [
            COL_CYCLONE_ID,
            COL_FILE_NAME,
            COL_LON,
            COL_LAT,
            COL_LABEL,
            COL_SECONDARY_LABEL,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        Self { header, records }
    }

    /// Read a table from a tab-separated file.
    pub fn read<P: AsRef<Path>>(path: P) -> RingResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let table = Self::parse(&text)?;
        debug!(path = %path.display(), rows = table.len(), "Read event table");
        Ok(table)
    }

    /// Parse tab-separated text.
    pub fn parse(text: &str) -> RingResult<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let header: Vec<String> = match lines.next() {
            Some((_, line)) => line.split('\t').map(|s| s.trim().to_string()).collect(),
            None => return Err(RingError::MissingColumn(COL_CYCLONE_ID.to_string())),
        };

        for required in REQUIRED_COLUMNS {
            if !header.iter().any(|h| h == required) {
                return Err(RingError::MissingColumn(required.to_string()));
            }
        }

        let mut records = Vec::new();
        for (index, line) in lines {
            let line_no = index + 1;
            let cells: Vec<&str> = line.split('\t').map(str::trim).collect();
            if cells.len() != header.len() {
                return Err(RingError::RaggedRow {
                    line: line_no,
                    expected: header.len(),
                    found: cells.len(),
                });
            }
            records.push(parse_record(&header, &cells, line_no)?);
        }

        Ok(Self { header, records })
    }

    /// Serialize back to tab-separated text, keeping the original column order.
    pub fn to_tsv_string(&self) -> String {
        let mut out = self.header.join("\t");
        out.push('\n');
        for record in &self.records {
            let row: Vec<String> = self.header.iter().map(|c| record.cell(c)).collect();
            out.push_str(&row.join("\t"));
            out.push('\n');
        }
        out
    }

    /// Write the table to a tab-separated file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> RingResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_tsv_string())?;
        debug!(path = %path.display(), rows = self.len(), "Wrote event table");
        Ok(())
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [EventRecord] {
        &mut self.records
    }

    pub fn get(&self, index: usize) -> Option<&EventRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_record(header: &[String], cells: &[&str], line: usize) -> RingResult<EventRecord> {
    let mut record = EventRecord::new(0, "", f64::NAN, f64::NAN, Label::Unknown);

    for (column, value) in header.iter().zip(cells) {
        let invalid = || RingError::InvalidValue {
            column: column.clone(),
            line,
            value: value.to_string(),
        };
        match column.as_str() {
            COL_CYCLONE_ID => {
                // Identifiers sometimes round-trip through float columns.
                let id = value.parse::<f64>().map_err(|_| invalid())?;
                if id < 0.0 || id.fract() != 0.0 {
                    return Err(invalid());
                }
                record.cyclone_id = id as u32;
            }
            COL_FILE_NAME => record.file_name = value.to_string(),
            COL_LON => record.lon = parse_coordinate(value).ok_or_else(invalid)?,
            COL_LAT => record.lat = parse_coordinate(value).ok_or_else(invalid)?,
            COL_LABEL => record.label = value.parse().map_err(|_| invalid())?,
            COL_SECONDARY_LABEL => {
                record.secondary_label = if is_missing(value) {
                    None
                } else {
                    Some(value.parse().map_err(|_| invalid())?)
                };
            }
            other => {
                record.extra.insert(other.to_string(), value.to_string());
            }
        }
    }

    Ok(record)
}

fn is_missing(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("nan") || value.eq_ignore_ascii_case("-nan")
}

fn parse_coordinate(value: &str) -> Option<f64> {
    if is_missing(value) {
        return Some(f64::NAN);
    }
    value.parse::<f64>().ok()
}

fn format_coordinate(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        String::new()
    }
}
