//! Column layout of a recorded frame row.
//!
//! The recorder writes one frame per row with a fixed layout:
//!
//! | Columns (1-based) | Content |
//! |---|---|
//! | 1–6 | `Fx Fy Fz Tx Ty Tz` |
//! | 7–9 | position `x y z` |
//! | 10–13 | orientation components |
//! | 14–252 | the 239 contact channels in geometry order |
//!
//! Recorders may append further columns; they are ignored.

use std::ops::Range;

use crate::error::{Result, TactileError};
use crate::frame::{
    CONTACT_CHANNELS, ORIENTATION_CHANNELS, POSITION_CHANNELS, RawFrame, WRENCH_CHANNELS,
};

/// Named, fixed-offset fields of a frame row.
///
/// # Example
///
/// ```
/// use tactile_types::FrameSchema;
///
/// let schema = FrameSchema::STANDARD;
/// assert_eq!(schema.min_columns(), 252);
/// assert_eq!(schema.contacts.start, 13);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSchema {
    /// Wrench columns (0-based, half-open).
    pub wrench: Range<usize>,
    /// Position columns.
    pub position: Range<usize>,
    /// Orientation columns.
    pub orientation: Range<usize>,
    /// Contact channel columns.
    pub contacts: Range<usize>,
}

impl FrameSchema {
    /// The layout written by the press rig recorder.
    pub const STANDARD: Self = Self {
        wrench: 0..WRENCH_CHANNELS,
        position: WRENCH_CHANNELS..WRENCH_CHANNELS + POSITION_CHANNELS,
        orientation: WRENCH_CHANNELS + POSITION_CHANNELS
            ..WRENCH_CHANNELS + POSITION_CHANNELS + ORIENTATION_CHANNELS,
        contacts: WRENCH_CHANNELS + POSITION_CHANNELS + ORIENTATION_CHANNELS
            ..WRENCH_CHANNELS + POSITION_CHANNELS + ORIENTATION_CHANNELS + CONTACT_CHANNELS,
    };

    /// Returns the minimum number of columns a row must carry.
    #[must_use]
    pub const fn min_columns(&self) -> usize {
        self.contacts.end
    }

    /// Parses one comma-separated row into a frame.
    ///
    /// Empty or non-numeric cells become `NaN`; the resulting frame is then
    /// not usable and will be dropped by feature extraction.
    ///
    /// # Errors
    ///
    /// Returns [`TactileError::MalformedSample`] if the row has fewer than
    /// [`min_columns`](Self::min_columns) columns.
    pub fn parse_row(&self, sample: &str, row: usize, line: &str) -> Result<RawFrame> {
        let cells: Vec<&str> = line.split(',').collect();
        self.parse_cells(sample, row, &cells)
    }

    /// Parses pre-split cells into a frame.
    ///
    /// # Errors
    ///
    /// Returns [`TactileError::MalformedSample`] if there are too few cells.
    pub fn parse_cells(&self, sample: &str, row: usize, cells: &[&str]) -> Result<RawFrame> {
        if cells.len() < self.min_columns() {
            return Err(TactileError::malformed(
                sample,
                format!(
                    "row {row} has {} columns, expected at least {}",
                    cells.len(),
                    self.min_columns()
                ),
            ));
        }

        let mut wrench = [f64::NAN; WRENCH_CHANNELS];
        for (slot, cell) in wrench.iter_mut().zip(&cells[self.wrench.clone()]) {
            *slot = parse_cell(cell);
        }

        let mut position = [f64::NAN; POSITION_CHANNELS];
        for (slot, cell) in position.iter_mut().zip(&cells[self.position.clone()]) {
            *slot = parse_cell(cell);
        }

        let mut orientation = [f64::NAN; ORIENTATION_CHANNELS];
        for (slot, cell) in orientation.iter_mut().zip(&cells[self.orientation.clone()]) {
            *slot = parse_cell(cell);
        }

        let contacts = cells[self.contacts.clone()]
            .iter()
            .map(|c| parse_cell(c))
            .collect();

        RawFrame::new(wrench, position, orientation, contacts)
    }
}

impl Default for FrameSchema {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Parses a single cell, mapping missing or non-numeric content to `NaN`.
///
/// # Example
///
/// ```
/// use tactile_types::parse_cell;
///
/// assert!((parse_cell(" 1.5 ") - 1.5).abs() < 1e-12);
/// assert!(parse_cell("").is_nan());
/// assert!(parse_cell("n/a").is_nan());
/// ```
#[must_use]
pub fn parse_cell(cell: &str) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(columns: usize, fill: &str) -> String {
        vec![fill; columns].join(",")
    }

    #[test]
    fn schema_offsets() {
        let schema = FrameSchema::STANDARD;
        assert_eq!(schema.wrench, 0..6);
        assert_eq!(schema.position, 6..9);
        assert_eq!(schema.orientation, 9..13);
        assert_eq!(schema.contacts, 13..252);
        assert_eq!(schema.min_columns(), 252);
    }

    #[test]
    fn parse_row_full() {
        let mut cells: Vec<String> = (0..252).map(|i| format!("{i}")).collect();
        cells[2] = "-3.5".to_string();
        let line = cells.join(",");

        let frame = FrameSchema::STANDARD.parse_row("s", 0, &line).unwrap();
        assert!((frame.force_z() + 3.5).abs() < 1e-12);
        assert!((frame.position()[0] - 6.0).abs() < 1e-12);
        assert!((frame.orientation()[3] - 12.0).abs() < 1e-12);
        assert_eq!(frame.contacts().len(), CONTACT_CHANNELS);
        assert!((frame.contacts()[0] - 13.0).abs() < 1e-12);
        assert!((frame.contacts()[238] - 251.0).abs() < 1e-12);
        assert!(frame.is_usable());
    }

    #[test]
    fn parse_row_ignores_extra_columns() {
        let frame = FrameSchema::STANDARD
            .parse_row("s", 0, &row(730, "1"))
            .unwrap();
        assert!(frame.is_usable());
    }

    #[test]
    fn parse_row_too_short_is_malformed() {
        let result = FrameSchema::STANDARD.parse_row("s", 4, &row(100, "1"));
        match result {
            Err(TactileError::MalformedSample { sample, reason }) => {
                assert_eq!(sample, "s");
                assert!(reason.contains("row 4"));
                assert!(reason.contains("100"));
            }
            other => panic!("expected malformed sample, got {other:?}"),
        }
    }

    #[test]
    fn parse_row_bad_cell_becomes_nan() {
        let mut cells = vec!["1"; 252];
        cells[20] = "oops";
        let frame = FrameSchema::STANDARD
            .parse_cells("s", 0, &cells)
            .unwrap();
        assert!(frame.contacts()[7].is_nan());
        assert!(!frame.is_usable());
    }
}
