//! Worksheet type

use crate::cell::{CellAddress, CellData, CellRange, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::picture::Picture;
use crate::{MAX_COLS, MAX_ROWS};

/// A worksheet (single sheet in a workbook)
#[derive(Debug)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Cell storage
    cells: CellStorage,
    /// Sheet is visible
    visible: bool,
    /// Pictures in insertion order
    pictures: Vec<Picture>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
            visible: true,
            pictures: Vec::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the sheet is visible
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Set sheet visibility
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    // === Cell Access ===

    /// Get a cell by address string (e.g., "A1")
    pub fn cell(&self, address: &str) -> Result<Option<&CellData>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cells.get(addr.row, addr.col))
    }

    /// Get cell value (convenience method)
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get cell value by indices, `Empty` when nothing is stored
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or(CellValue::Empty)
    }

    // === Cell Modification ===

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row and column indices
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.cells.set_value(row, col, value.into());
        Ok(())
    }

    /// Style index of a cell (0 when the cell is absent or unformatted)
    pub fn cell_style_at(&self, row: u32, col: u16) -> u32 {
        self.cells.get(row, col).map_or(0, |c| c.style_index)
    }

    /// Set a cell's style index, keeping its value
    pub fn set_cell_style_at(&mut self, row: u32, col: u16, style_index: u32) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.cells.set_style(row, col, style_index);
        Ok(())
    }

    /// Set a cell formula by address string
    pub fn set_cell_formula(&mut self, address: &str, formula: &str) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.validate_cell_position(addr.row, addr.col)?;

        let formula = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={}", formula)
        };

        self.cells
            .set_value(addr.row, addr.col, CellValue::formula(formula));
        Ok(())
    }

    // === Extents ===

    /// Get the used range (bounds of all non-empty cells)
    pub fn used_range(&self) -> Option<CellRange> {
        self.cells
            .used_bounds()
            .map(|(min_row, min_col, max_row, max_col)| {
                CellRange::from_indices(min_row, min_col, max_row, max_col)
            })
    }

    /// Last row holding a value (0-based)
    pub fn last_row(&self) -> Option<u32> {
        self.cells.used_bounds().map(|(_, _, max_row, _)| max_row)
    }

    /// Last column holding a value anywhere in the sheet (0-based)
    pub fn last_column(&self) -> Option<u16> {
        self.cells.used_bounds().map(|(_, _, _, max_col)| max_col)
    }

    /// Last column holding a value in one row (0-based)
    pub fn last_column_in_row(&self, row: u32) -> Option<u16> {
        self.cells.last_col_in_row(row)
    }

    // === Row/Column Operations ===

    /// Get row height
    pub fn row_height(&self, row: u32) -> f64 {
        self.cells.row_height(row)
    }

    /// Set row height
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.cells.set_row_height(row, height);
    }

    /// Check if row is hidden
    pub fn is_row_hidden(&self, row: u32) -> bool {
        self.cells.is_row_hidden(row)
    }

    /// Set row hidden state
    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) {
        self.cells.set_row_hidden(row, hidden);
    }

    /// Check whether a row has a non-default height
    pub fn has_custom_row_height(&self, row: u32) -> bool {
        self.cells.has_custom_height(row)
    }

    /// Rows carrying a custom height or hidden flag
    pub fn customized_rows(&self) -> impl Iterator<Item = u32> + '_ {
        self.cells.customized_rows()
    }

    /// Get column width
    pub fn column_width(&self, col: u16) -> f64 {
        self.cells.column_width(col)
    }

    /// Set column width
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.cells.set_column_width(col, width);
    }

    /// Check if column is hidden
    pub fn is_column_hidden(&self, col: u16) -> bool {
        self.cells.is_column_hidden(col)
    }

    /// Set column hidden state
    pub fn set_column_hidden(&mut self, col: u16, hidden: bool) {
        self.cells.set_column_hidden(col, hidden);
    }

    /// Columns carrying a custom width or hidden flag
    pub fn customized_columns(&self) -> Vec<u16> {
        self.cells.customized_columns()
    }

    // === Merged Cells ===

    /// Get merged regions
    pub fn merged_regions(&self) -> &[CellRange] {
        self.cells.merged_regions()
    }

    /// Merge cells
    pub fn merge_cells(&mut self, range: &CellRange) -> Result<()> {
        if self
            .cells
            .merged_regions()
            .iter()
            .any(|existing| range.overlaps(existing))
        {
            return Err(Error::MergedCellConflict(range.to_string()));
        }
        self.cells.add_merged_region(*range);
        Ok(())
    }

    /// Check if a cell belongs to a merged region
    pub fn is_merged(&self, row: u32, col: u16) -> bool {
        self.cells.is_merged(row, col)
    }

    // === Pictures ===

    /// Add a picture; its anchor must lie inside the sheet
    pub fn add_picture(&mut self, picture: Picture) -> Result<()> {
        self.validate_cell_position(picture.row(), picture.col())?;
        self.pictures.push(picture);
        Ok(())
    }

    /// Pictures in insertion order
    pub fn pictures(&self) -> &[Picture] {
        &self.pictures
    }

    /// Number of pictures on the sheet
    pub fn picture_count(&self) -> usize {
        self.pictures.len()
    }

    /// Pictures anchored at one cell
    pub fn pictures_at(&self, row: u32, col: u16) -> impl Iterator<Item = &Picture> {
        self.pictures
            .iter()
            .filter(move |p| p.row() == row && p.col() == col)
    }

    // === Iteration ===

    /// Get the number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.cells.cell_count()
    }

    /// Check if the worksheet has neither cells nor pictures
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.pictures.is_empty()
    }

    /// Iterate over all non-empty cells
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.cells.iter()
    }

    /// Iterate over the non-empty cells of one row
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.cells.iter_row(row)
    }

    fn validate_cell_position(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(())
    }
}
