//! Fixed-size window selection around a storm centre.
//!
//! A swath is roughly 161 rows along track by 82 cells across track. The
//! model wants 80 × 80, so the scan is cut down in three steps:
//!
//! ```text
//!  full swath          valid extent        80 columns          80 rows
//! ┌──────────┐        ┌────────┐          ┌──────┐            ┌──────┐
//! │..........│        │        │          │      │            │  x   │
//! │.  x     .│  ──►   │  x     │   ──►    │ x    │    ──►     │      │
//! │.        .│        │        │          │      │            └──────┘
//! └──────────┘        └────────┘          └──────┘
//! ```
//!
//! 1. Drop leading/trailing rows and columns without any retrieval.
//! 2. Remove columns from the side farther from the target.
//! 3. Even out the row count, then take 80 rows. Near an edge the window is
//!    pinned to that edge; in the interior its start is drawn at random
//!    within the range that keeps the target inside.
//!
//! The selection is a pure function of the grid, the target and the random
//! source, so a seeded RNG reproduces the same crop.

use std::ops::Range;

use rand::Rng;
use ring_common::{haversine_km, GeoPoint, WindGrid};

use crate::error::WindowError;

/// Window height in rows.
pub const WINDOW_ROWS: usize = 80;

/// Window width in columns.
pub const WINDOW_COLS: usize = 80;

/// Targets closer than this many rows to an edge pin the window to it.
pub const EDGE_MARGIN: usize = 40;

/// A crop of a grid, in the grid's own row/column indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
    /// Row of the cell nearest the storm centre
    pub target_row: usize,
    /// Column of the cell nearest the storm centre
    pub target_col: usize,
}

impl Window {
    /// Target position relative to the window origin.
    pub fn target_in_window(&self) -> (usize, usize) {
        (
            self.target_row - self.rows.start,
            self.target_col - self.cols.start,
        )
    }

    pub fn contains_target(&self) -> bool {
        self.rows.contains(&self.target_row) && self.cols.contains(&self.target_col)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.cols.len()
    }
}

/// Find the cell whose coordinates are closest to `target`.
///
/// Cells without coordinates are ignored. Returns `None` for a NaN target or
/// a grid without any coordinates.
pub fn nearest_cell(grid: &WindGrid, target: GeoPoint) -> Option<(usize, usize)> {
    if !target.is_finite() {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for (idx, (&lon, &lat)) in grid.lon.iter().zip(&grid.lat).enumerate() {
        if !lon.is_finite() || !lat.is_finite() {
            continue;
        }
        let d = haversine_km(target, GeoPoint::new(lon as f64, lat as f64));
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((idx, d));
        }
    }

    best.map(|(idx, _)| (idx / grid.cols, idx % grid.cols))
}

/// Rows and columns spanned by cells with a retrieval.
///
/// Fully-missing rows and columns at the edges are excluded; gaps in the
/// interior are kept.
pub fn valid_extent(grid: &WindGrid) -> Option<(Range<usize>, Range<usize>)> {
    let first_row = (0..grid.rows).find(|&r| grid.row_has_data(r))?;
    let last_row = (0..grid.rows).rev().find(|&r| grid.row_has_data(r))?;
    let first_col = (0..grid.cols).find(|&c| grid.col_has_data(c))?;
    let last_col = (0..grid.cols).rev().find(|&c| grid.col_has_data(c))?;

    Some((first_row..last_row + 1, first_col..last_col + 1))
}

/// Choose the 80 × 80 window for `target`.
pub fn select_window<R: Rng + ?Sized>(
    grid: &WindGrid,
    target: GeoPoint,
    rng: &mut R,
) -> Result<Window, WindowError> {
    let (target_row, target_col) =
        nearest_cell(grid, target).ok_or(WindowError::NoValidNeighbor)?;

    let too_small = |rows: usize, cols: usize| WindowError::GridTooSmall {
        rows,
        cols,
        min_rows: WINDOW_ROWS,
        min_cols: WINDOW_COLS,
    };

    let (row_extent, col_extent) = valid_extent(grid).ok_or_else(|| too_small(0, 0))?;
    if !row_extent.contains(&target_row) || !col_extent.contains(&target_col) {
        return Err(WindowError::TargetOutsideSwath {
            row: target_row,
            col: target_col,
        });
    }
    if row_extent.len() < WINDOW_ROWS || col_extent.len() < WINDOW_COLS {
        return Err(too_small(row_extent.len(), col_extent.len()));
    }

    let col_start = col_extent.start
        + column_offset(col_extent.len(), target_col - col_extent.start);

    let (even_rows, local_row) = even_rows(row_extent, target_row);
    let row_start = even_rows.start + row_offset(even_rows.len(), local_row, rng);

    let window = Window {
        rows: row_start..row_start + WINDOW_ROWS,
        cols: col_start..col_start + WINDOW_COLS,
        target_row,
        target_col,
    };
    debug_assert!(window.contains_target());
    Ok(window)
}

/// First kept column when trimming `width` columns down to the window.
///
/// A target in the right half keeps the right-hand columns, otherwise the
/// left-hand ones. The result is clamped so the target column stays inside.
fn column_offset(width: usize, target: usize) -> usize {
    let excess = width - WINDOW_COLS;
    let preferred = if target >= width / 2 { excess } else { 0 };
    let lo = target.saturating_sub(WINDOW_COLS - 1);
    let hi = target.min(excess);
    preferred.clamp(lo, hi)
}

/// Drop one row from the side farther from the target when the count is odd.
///
/// Returns the remaining rows and the target's offset within them.
fn even_rows(rows: Range<usize>, target: usize) -> (Range<usize>, usize) {
    let local = target - rows.start;
    if rows.len() % 2 == 0 {
        return (rows, local);
    }
    if local >= rows.len() / 2 {
        (rows.start + 1..rows.end, local - 1)
    } else {
        (rows.start..rows.end - 1, local)
    }
}

/// First window row within `height` rows for a target at row `target`.
fn row_offset<R: Rng + ?Sized>(height: usize, target: usize, rng: &mut R) -> usize {
    let dist_top = target;
    let dist_bottom = height - 1 - target;

    if dist_top < EDGE_MARGIN {
        return 0;
    }
    if dist_bottom <= EDGE_MARGIN {
        return height - WINDOW_ROWS;
    }

    if dist_top <= dist_bottom {
        // Draw the start so that the target is on or after it.
        let lo = target.saturating_sub(WINDOW_ROWS - 1);
        let hi = target.min(height - WINDOW_ROWS);
        rng.gen_range(lo..=hi)
    } else {
        // Draw the (exclusive) end so that the target is before it.
        let lo = (target + 1).max(WINDOW_ROWS);
        let hi = (target + WINDOW_ROWS).min(height);
        rng.gen_range(lo..=hi) - WINDOW_ROWS
    }
}
