//! Cell storage implementation
//!
//! Sparse storage for worksheet cells: only non-empty cells are kept, in a
//! row-based BTreeMap so rows and the cells inside them iterate in order.

use std::collections::BTreeMap;

use super::{CellAddress, CellRange, CellValue};

/// Data for a single stored cell
#[derive(Debug, Clone, Default)]
pub struct CellData {
    /// The cell's value
    pub value: CellValue,
    /// Index into the workbook's cell formats (0 = default format)
    pub style_index: u32,
}

impl CellData {
    /// Create a new cell with a value and default style
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            style_index: 0,
        }
    }

    /// Create a new cell with a value and style
    pub fn with_style(value: CellValue, style_index: u32) -> Self {
        Self { value, style_index }
    }

    /// Check if this cell is effectively empty (no value and default style)
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.style_index == 0
    }

    /// Check if this cell carries a value (formatting-only cells do not)
    pub fn has_value(&self) -> bool {
        !self.value.is_empty()
    }
}

/// Sparse row-based storage for worksheet cells
///
/// Structure: `BTreeMap<row_index, BTreeMap<col_index, CellData>>`
#[derive(Debug)]
pub struct CellStorage {
    /// Row index → column map
    rows: BTreeMap<u32, BTreeMap<u16, CellData>>,

    /// Default row height in points (default: 15.0)
    default_row_height: f64,

    /// Default column width in characters (default: 8.43)
    default_column_width: f64,

    /// Custom row heights
    row_heights: BTreeMap<u32, f64>,

    /// Hidden rows
    hidden_rows: BTreeMap<u32, bool>,

    /// Custom column widths
    column_widths: BTreeMap<u16, f64>,

    /// Hidden columns
    hidden_columns: BTreeMap<u16, bool>,

    /// Merged cell regions
    merged_regions: Vec<CellRange>,
}

impl CellStorage {
    /// Create a new empty cell storage
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            default_row_height: 15.0,
            default_column_width: 8.43,
            row_heights: BTreeMap::new(),
            hidden_rows: BTreeMap::new(),
            column_widths: BTreeMap::new(),
            hidden_columns: BTreeMap::new(),
            merged_regions: Vec::new(),
        }
    }

    /// Get a cell
    pub fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    /// Set cell data; data that is empty (no value, default style) removes the cell.
    pub fn set(&mut self, row: u32, col: u16, data: CellData) {
        if data.is_empty() {
            self.remove(row, col);
        } else {
            self.rows.entry(row).or_default().insert(col, data);
        }
    }

    /// Set just the cell value (preserving style)
    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        let style_index = self.get(row, col).map_or(0, |cell| cell.style_index);
        self.set(row, col, CellData::with_style(value, style_index));
    }

    /// Set just the cell style (preserving value)
    pub fn set_style(&mut self, row: u32, col: u16, style_index: u32) {
        let value = self
            .get(row, col)
            .map(|cell| cell.value.clone())
            .unwrap_or_default();
        self.set(row, col, CellData::with_style(value, style_index));
    }

    /// Remove a cell
    pub fn remove(&mut self, row: u32, col: u16) -> Option<CellData> {
        let row_map = self.rows.get_mut(&row)?;
        let removed = row_map.remove(&col);
        if row_map.is_empty() {
            self.rows.remove(&row);
        }
        removed
    }

    /// Get the number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    /// Check if storage is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the bounds of cells holding a value
    ///
    /// Formatting-only cells do not widen the bounds.
    /// Returns (min_row, min_col, max_row, max_col) or None if no cell has a value
    pub fn used_bounds(&self) -> Option<(u32, u16, u32, u16)> {
        let mut bounds: Option<(u32, u16, u32, u16)> = None;
        for (&row, cols) in &self.rows {
            let mut valued = cols.iter().filter(|(_, data)| data.has_value());
            let Some((&first, _)) = valued.next() else {
                continue;
            };
            let last = valued.last().map_or(first, |(&col, _)| col);
            bounds = Some(match bounds {
                None => (row, first, row, last),
                Some((min_row, min_col, _, max_col)) => {
                    (min_row, min_col.min(first), row, max_col.max(last))
                }
            });
        }
        bounds
    }

    /// Highest column holding a value in one row
    pub fn last_col_in_row(&self, row: u32) -> Option<u16> {
        self.rows.get(&row).and_then(|cols| {
            cols.iter()
                .rev()
                .find(|(_, data)| data.has_value())
                .map(|(&col, _)| col)
        })
    }

    /// Iterate over all cells in row order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.rows
            .iter()
            .flat_map(|(&row, cols)| cols.iter().map(move |(&col, data)| (row, col, data)))
    }

    /// Iterate over cells in a specific row
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.rows
            .get(&row)
            .into_iter()
            .flat_map(|cols| cols.iter().map(|(&col, data)| (col, data)))
    }

    /// Get row height (returns default if not customized)
    pub fn row_height(&self, row: u32) -> f64 {
        self.row_heights
            .get(&row)
            .copied()
            .unwrap_or(self.default_row_height)
    }

    /// Set custom row height
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        if (height - self.default_row_height).abs() < 0.001 {
            self.row_heights.remove(&row);
        } else {
            self.row_heights.insert(row, height);
        }
    }

    /// Check if row is hidden
    pub fn is_row_hidden(&self, row: u32) -> bool {
        self.hidden_rows.get(&row).copied().unwrap_or(false)
    }

    /// Set row hidden state
    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) {
        if hidden {
            self.hidden_rows.insert(row, true);
        } else {
            self.hidden_rows.remove(&row);
        }
    }

    /// Get column width (returns default if not customized)
    pub fn column_width(&self, col: u16) -> f64 {
        self.column_widths
            .get(&col)
            .copied()
            .unwrap_or(self.default_column_width)
    }

    /// Set custom column width
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        if (width - self.default_column_width).abs() < 0.001 {
            self.column_widths.remove(&col);
        } else {
            self.column_widths.insert(col, width);
        }
    }

    /// Check if column is hidden
    pub fn is_column_hidden(&self, col: u16) -> bool {
        self.hidden_columns.get(&col).copied().unwrap_or(false)
    }

    /// Set column hidden state
    pub fn set_column_hidden(&mut self, col: u16, hidden: bool) {
        if hidden {
            self.hidden_columns.insert(col, true);
        } else {
            self.hidden_columns.remove(&col);
        }
    }

    /// Rows with a custom height or hidden flag, in order
    pub fn customized_rows(&self) -> impl Iterator<Item = u32> + '_ {
        let mut rows: Vec<u32> = self
            .row_heights
            .keys()
            .chain(self.hidden_rows.keys())
            .copied()
            .collect();
        rows.sort_unstable();
        rows.dedup();
        rows.into_iter()
    }

    /// Columns with a custom width or hidden flag, in order
    pub fn customized_columns(&self) -> Vec<u16> {
        let mut cols: Vec<u16> = self
            .column_widths
            .keys()
            .chain(self.hidden_columns.keys())
            .copied()
            .collect();
        cols.sort_unstable();
        cols.dedup();
        cols
    }

    /// Check whether a row carries a custom height
    pub fn has_custom_height(&self, row: u32) -> bool {
        self.row_heights.contains_key(&row)
    }

    /// Get merged regions
    pub fn merged_regions(&self) -> &[CellRange] {
        &self.merged_regions
    }

    /// Add a merged region
    pub fn add_merged_region(&mut self, range: CellRange) {
        self.merged_regions.push(range);
    }

    /// Check if a cell is part of a merged region
    pub fn is_merged(&self, row: u32, col: u16) -> bool {
        let addr = CellAddress::new(row, col);
        self.merged_regions.iter().any(|r| r.contains(&addr))
    }
}

impl Default for CellStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let mut storage = CellStorage::new();

        storage.set_value(0, 0, CellValue::Number(42.0));
        assert_eq!(storage.get(0, 0).unwrap().value.as_number(), Some(42.0));
        assert!(storage.get(1, 1).is_none());
    }

    #[test]
    fn test_empty_cells_not_stored() {
        let mut storage = CellStorage::new();

        storage.set_value(0, 0, CellValue::Number(42.0));
        assert_eq!(storage.cell_count(), 1);

        storage.set_value(0, 0, CellValue::Empty);
        assert_eq!(storage.cell_count(), 0);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_style_survives_value_changes() {
        let mut storage = CellStorage::new();

        storage.set_style(1, 1, 3);
        assert_eq!(storage.cell_count(), 1);
        assert!(!storage.get(1, 1).unwrap().has_value());

        storage.set_value(1, 1, CellValue::Number(45321.0));
        let cell = storage.get(1, 1).unwrap();
        assert_eq!(cell.style_index, 3);
        assert_eq!(cell.value.as_number(), Some(45321.0));

        // Clearing the value keeps the formatted blank
        storage.set_value(1, 1, CellValue::Empty);
        assert_eq!(storage.get(1, 1).unwrap().style_index, 3);

        storage.set_style(1, 1, 0);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_formatted_blanks_do_not_extend_bounds() {
        let mut storage = CellStorage::new();

        storage.set_value(2, 1, CellValue::Number(1.0));
        storage.set_style(2, 6, 2);
        storage.set_style(9, 0, 2);

        assert_eq!(storage.used_bounds(), Some((2, 1, 2, 1)));
        assert_eq!(storage.last_col_in_row(2), Some(1));
        assert_eq!(storage.last_col_in_row(9), None);
    }

    #[test]
    fn test_used_bounds_and_row_tail() {
        let mut storage = CellStorage::new();
        assert!(storage.used_bounds().is_none());

        storage.set_value(5, 3, CellValue::Number(1.0));
        storage.set_value(10, 7, CellValue::Number(2.0));
        storage.set_value(2, 1, CellValue::Number(3.0));

        assert_eq!(storage.used_bounds(), Some((2, 1, 10, 7)));
        assert_eq!(storage.last_col_in_row(5), Some(3));
        assert_eq!(storage.last_col_in_row(10), Some(7));
        assert_eq!(storage.last_col_in_row(4), None);
    }

    #[test]
    fn test_row_column_properties() {
        let mut storage = CellStorage::new();

        assert_eq!(storage.row_height(0), 15.0);
        assert_eq!(storage.column_width(0), 8.43);

        storage.set_row_height(5, 30.0);
        storage.set_column_width(3, 20.0);
        storage.set_row_hidden(10, true);
        storage.set_column_hidden(5, true);

        assert_eq!(storage.row_height(5), 30.0);
        assert_eq!(storage.column_width(3), 20.0);
        assert!(storage.is_row_hidden(10));
        assert!(storage.is_column_hidden(5));
        assert_eq!(storage.customized_rows().collect::<Vec<_>>(), vec![5, 10]);
        assert_eq!(storage.customized_columns(), vec![3, 5]);
    }
}
