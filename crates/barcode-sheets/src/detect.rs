//! Locating the identifier column

use std::fmt;

use barcode_sheets_core::CellAddress;

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::options::DetectorOptions;
use crate::sscc::Sscc;

/// Which heuristic found the column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionPhase {
    /// A cell in `row` carries the header name
    Header { row: u32 },
    /// The column holds `matches` identifiers among its sampled rows
    Statistical { matches: usize },
}

/// A detected identifier column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    /// 1-based column index
    pub column: u32,
    pub phase: DetectionPhase,
}

impl Detection {
    /// Column letters, e.g. `"C"`
    pub fn column_letters(&self) -> String {
        let index = self.column.saturating_sub(1);
        CellAddress::column_to_letters(u16::try_from(index).unwrap_or(u16::MAX))
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            DetectionPhase::Header { row } => write!(
                f,
                "column {} ({}) by header in row {}",
                self.column,
                self.column_letters(),
                row
            ),
            DetectionPhase::Statistical { matches } => write!(
                f,
                "column {} ({}) by {} identifier values",
                self.column,
                self.column_letters(),
                matches
            ),
        }
    }
}

/// Two-phase search for the column holding identifiers.
///
/// 1. Header scan, row-major over the first `header_rows` rows: the first
///    cell whose trimmed text equals the header name (ignoring case) wins.
/// 2. Statistical scan, column by column from the left: the first column with
///    `min_matches` identifiers among its first `sample_rows` rows wins.
#[derive(Debug, Clone, Default)]
pub struct ColumnDetector {
    options: DetectorOptions,
}

impl ColumnDetector {
    pub fn new(options: DetectorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DetectorOptions {
        &self.options
    }

    /// Find the identifier column or fail with [`Error::ColumnNotFound`]
    pub fn detect<G: Grid + ?Sized>(&self, grid: &G) -> Result<Detection> {
        self.find_header(grid)
            .or_else(|| self.find_by_values(grid))
            .ok_or(Error::ColumnNotFound)
    }

    fn find_header<G: Grid + ?Sized>(&self, grid: &G) -> Option<Detection> {
        let last_row = grid.last_row().min(self.options.header_rows);
        let last_col = grid.last_column();
        let header = self.options.header_name.trim();

        for row in 1..=last_row {
            for col in 1..=last_col {
                if grid.cell_text(row, col).trim().eq_ignore_ascii_case(header) {
                    return Some(Detection {
                        column: col,
                        phase: DetectionPhase::Header { row },
                    });
                }
            }
        }
        None
    }

    fn find_by_values<G: Grid + ?Sized>(&self, grid: &G) -> Option<Detection> {
        let last_row = grid.last_row().min(self.options.sample_rows);
        let last_col = grid.last_column();
        let threshold = self.options.min_matches;

        for col in 1..=last_col {
            let mut matches = 0;
            for row in 1..=last_row {
                if Sscc::extract(&grid.cell_text(row, col)).is_some() {
                    matches += 1;
                    if matches >= threshold {
                        return Some(Detection {
                            column: col,
                            phase: DetectionPhase::Statistical { matches },
                        });
                    }
                }
            }
            log::trace!("column {} has {} identifier values", col, matches);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barcode_sheets_core::Worksheet;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const ID: &str = "123456789012345678";

    fn sheet(rows: &[&[&str]]) -> Worksheet {
        let mut ws = Worksheet::new("Sheet1");
        for (r, cells) in rows.iter().enumerate() {
            for (c, text) in cells.iter().enumerate() {
                if !text.is_empty() {
                    ws.set_cell_text(r as u32 + 1, c as u32 + 1, text).unwrap();
                }
            }
        }
        ws
    }

    fn detect(ws: &Worksheet) -> Result<Detection> {
        ColumnDetector::default().detect(ws)
    }

    #[test]
    fn test_header_match() {
        let ws = sheet(&[&["Order", "Qty", "  SsCc "], &["1", "2", "x"]]);
        assert_eq!(
            detect(&ws).unwrap(),
            Detection {
                column: 3,
                phase: DetectionPhase::Header { row: 1 }
            }
        );
    }

    #[test]
    fn test_header_wins_over_values() {
        let ws = sheet(&[
            &[ID, "", "", "SSCC"],
            &[ID, "", "", ""],
            &[ID, "", "", ""],
            &[ID, "", "", ""],
        ]);
        let found = detect(&ws).unwrap();
        assert_eq!(found.column, 4);
        assert_eq!(found.phase, DetectionPhase::Header { row: 1 });
    }

    #[test]
    fn test_header_row_major_tie_break() {
        // Row 2 col 1 comes after row 1 col 3 in row-major order
        let ws = sheet(&[&["", "", "sscc"], &["sscc", "", ""]]);
        assert_eq!(detect(&ws).unwrap().column, 3);
    }

    #[test]
    fn test_header_below_row_ten_ignored() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_text(11, 2, "SSCC").unwrap();
        assert!(matches!(detect(&ws), Err(Error::ColumnNotFound)));

        ws.set_cell_text(10, 3, "SSCC").unwrap();
        assert_eq!(detect(&ws).unwrap().column, 3);
    }

    #[test]
    fn test_header_must_match_exactly() {
        let ws = sheet(&[&["SSCC code", "sscc#"], &["x", "y"]]);
        assert!(matches!(detect(&ws), Err(Error::ColumnNotFound)));
    }

    #[test]
    fn test_statistical_leftmost_column() {
        let ws = sheet(&[
            &["a", ID, ID],
            &["b", ID, ID],
            &["c", ID, ID],
        ]);
        assert_eq!(
            detect(&ws).unwrap(),
            Detection {
                column: 2,
                phase: DetectionPhase::Statistical { matches: 3 }
            }
        );
    }

    #[test]
    fn test_statistical_needs_three() {
        let ws = sheet(&[&[ID, "x"], &[ID, ID], &["nope", ID], &["", ID]]);
        // Column 1 only has two identifiers
        assert_eq!(detect(&ws).unwrap().column, 2);
    }

    #[test]
    fn test_statistical_only_first_fifty_rows() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_text(1, 1, "header").unwrap();
        for row in 49..=52 {
            ws.set_cell_text(row, 1, ID).unwrap();
        }
        // Rows 49 and 50 are sampled, 51 and 52 are not
        assert!(matches!(detect(&ws), Err(Error::ColumnNotFound)));

        ws.set_cell_text(48, 1, ID).unwrap();
        assert_eq!(
            detect(&ws).unwrap().phase,
            DetectionPhase::Statistical { matches: 3 }
        );
    }

    #[test]
    fn test_empty_grid() {
        let ws = Worksheet::new("Sheet1");
        assert!(matches!(detect(&ws), Err(Error::ColumnNotFound)));
    }

    #[test]
    fn test_custom_options() {
        let detector = ColumnDetector::new(DetectorOptions {
            header_name: "Pallet".to_string(),
            min_matches: 1,
            ..DetectorOptions::default()
        });
        let ws = sheet(&[&["x", "PALLET"]]);
        assert_eq!(detector.detect(&ws).unwrap().column, 2);

        let ws = sheet(&[&["x", ID]]);
        assert_eq!(detector.detect(&ws).unwrap().column, 2);
    }

    #[test]
    fn test_display() {
        let d = Detection {
            column: 3,
            phase: DetectionPhase::Header { row: 2 },
        };
        assert_eq!(d.column_letters(), "C");
        assert_eq!(d.to_string(), "column 3 (C) by header in row 2");
    }

    proptest! {
        /// The value scan never settles on a column with fewer than three identifiers
        #[test]
        fn prop_statistical_threshold(
            columns in proptest::collection::vec(
                proptest::collection::vec(any::<bool>(), 1..60),
                1..5,
            )
        ) {
            let mut ws = Worksheet::new("Sheet1");
            for (c, cells) in columns.iter().enumerate() {
                for (r, is_id) in cells.iter().enumerate() {
                    let text = if *is_id { ID } else { "filler" };
                    ws.set_cell_text(r as u32 + 1, c as u32 + 1, text).unwrap();
                }
            }

            let counts: Vec<usize> = columns
                .iter()
                .map(|cells| cells.iter().take(50).filter(|b| **b).count())
                .collect();
            match detect(&ws) {
                Ok(found) => {
                    let idx = found.column as usize - 1;
                    prop_assert!(counts[idx] >= 3);
                    prop_assert!(counts[..idx].iter().all(|n| *n < 3));
                }
                Err(_) => prop_assert!(counts.iter().all(|n| *n < 3)),
            }
        }
    }
}
