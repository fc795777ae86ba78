//! The dataset adapter: table rows in, samples out.

use std::path::{Path, PathBuf};

use rand::Rng;
use ring_common::EventTable;
use scan_reader::ScanStore;
use tracing::{debug, warn};

use crate::config::DatasetOptions;
use crate::error::{DatasetError, DatasetResult};
use crate::normalize::z_score;
use crate::sample::{build_sample, Sample, MISSING_SENTINEL};
use crate::window::select_window;

/// Labeled events backed by a directory of scans.
#[derive(Debug, Clone)]
pub struct CycloneDataset {
    table: EventTable,
    store: ScanStore,
    options: DatasetOptions,
}

impl CycloneDataset {
    /// Open a dataset from a table file and a scan directory.
    pub fn open<P: AsRef<Path>, Q: Into<PathBuf>>(
        table_path: P,
        dataset_dir: Q,
        options: DatasetOptions,
    ) -> DatasetResult<Self> {
        let table = EventTable::read(table_path)?;
        Self::new(table, ScanStore::new(dataset_dir), options)
    }

    pub fn new(
        table: EventTable,
        store: ScanStore,
        options: DatasetOptions,
    ) -> DatasetResult<Self> {
        if options.radius_km.is_nan() || options.radius_km <= 0.0 {
            return Err(DatasetError::config(format!(
                "radius must be positive, got {}",
                options.radius_km
            )));
        }
        Ok(Self {
            table,
            store,
            options,
        })
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn options(&self) -> &DatasetOptions {
        &self.options
    }

    pub fn table(&self) -> &EventTable {
        &self.table
    }

    /// Build the sample for row `index`.
    ///
    /// Returns `Ok(None)` for rows that cannot produce a sample: missing
    /// centre coordinates, unknown label, or a scan the window does not fit.
    /// Scan I/O errors are returned.
    pub fn get<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> DatasetResult<Option<Sample>> {
        let record = self.table.get(index).ok_or(DatasetError::IndexOutOfRange {
            index,
            len: self.len(),
        })?;

        if !record.has_coordinates() {
            warn!(index, file = %record.file_name, "Skipping row without storm centre");
            return Ok(None);
        }
        if !record.label.is_known() {
            warn!(index, file = %record.file_name, "Skipping row with unknown label");
            return Ok(None);
        }

        let grid = self.store.load(&record.file_name)?;
        let window = match select_window(&grid, record.center(), rng) {
            Ok(window) => window,
            Err(reason) => {
                warn!(index, file = %record.file_name, %reason, "Skipping row");
                return Ok(None);
            }
        };

        let mut sample = build_sample(index, &grid, &window, record, self.options.radius_km);
        if self.options.normalize {
            z_score(&mut sample.data);
        }
        sample.data.fill_nan(MISSING_SENTINEL);

        debug!(
            index,
            file = %record.file_name,
            rows = ?window.rows,
            cols = ?window.cols,
            "Built sample"
        );
        Ok(Some(sample))
    }
}
