//! 1-based worksheet access used by the pipeline

use std::sync::Arc;

use barcode_sheets_core::{
    CellAddress, Error as CoreError, Picture, PictureSize, Worksheet, MAX_COLS, MAX_ROWS,
};

use crate::error::Result;

/// A single worksheet seen as a 1-indexed grid of text cells.
///
/// "Last" extents count cells holding a value. They are 0 when nothing
/// qualifies, so `last + 1` is always the first free position. Embedded
/// images never count as content.
pub trait Grid {
    /// Display text of a cell; empty for blank cells
    fn cell_text(&self, row: u32, col: u32) -> String;

    /// Store a text value in a cell
    fn set_cell_text(&mut self, row: u32, col: u32, text: &str) -> Result<()>;

    /// Highest row holding a value
    fn last_row(&self) -> u32;

    /// Highest column holding a value in any row
    fn last_column(&self) -> u32;

    /// Highest column holding a value in `row`
    fn last_column_in_row(&self, row: u32) -> u32;

    /// Anchor an encoded image at a cell, shown at `size` regardless of its pixel size
    fn embed_image(&mut self, row: u32, col: u32, image: Arc<[u8]>, size: PictureSize)
        -> Result<()>;
}

/// Convert a 1-based position to the worksheet's 0-based indices
fn to_index(row: u32, col: u32) -> Result<(u32, u16)> {
    let r = row
        .checked_sub(1)
        .filter(|r| *r < MAX_ROWS)
        .ok_or(CoreError::RowOutOfBounds(row, MAX_ROWS))?;
    let c = col
        .checked_sub(1)
        .and_then(|c| u16::try_from(c).ok())
        .filter(|c| *c < MAX_COLS)
        .ok_or_else(|| {
            CoreError::ColumnOutOfBounds(u16::try_from(col).unwrap_or(u16::MAX), MAX_COLS)
        })?;
    Ok((r, c))
}

impl Grid for Worksheet {
    fn cell_text(&self, row: u32, col: u32) -> String {
        match to_index(row, col) {
            Ok((r, c)) => self.get_value_at(r, c).to_string(),
            Err(_) => String::new(),
        }
    }

    fn set_cell_text(&mut self, row: u32, col: u32, text: &str) -> Result<()> {
        let (r, c) = to_index(row, col)?;
        self.set_cell_value_at(r, c, text)?;
        Ok(())
    }

    fn last_row(&self) -> u32 {
        Worksheet::last_row(self).map_or(0, |r| r + 1)
    }

    fn last_column(&self) -> u32 {
        Worksheet::last_column(self).map_or(0, |c| u32::from(c) + 1)
    }

    fn last_column_in_row(&self, row: u32) -> u32 {
        match row.checked_sub(1) {
            Some(r) => Worksheet::last_column_in_row(self, r).map_or(0, |c| u32::from(c) + 1),
            None => 0,
        }
    }

    fn embed_image(
        &mut self,
        row: u32,
        col: u32,
        image: Arc<[u8]>,
        size: PictureSize,
    ) -> Result<()> {
        let (r, c) = to_index(row, col)?;
        let picture = Picture::new(CellAddress::new(r, c), image, size)?;
        self.add_picture(picture)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use barcode_sheets_core::CellValue;

    const PNG: [u8; 9] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0];

    #[test]
    fn test_empty_sheet_extents() {
        let ws = Worksheet::new("Sheet1");
        assert_eq!(Grid::last_row(&ws), 0);
        assert_eq!(Grid::last_column(&ws), 0);
        assert_eq!(Grid::last_column_in_row(&ws, 1), 0);
        assert_eq!(ws.cell_text(1, 1), "");
    }

    #[test]
    fn test_one_based_addressing() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_text(1, 1, "SSCC").unwrap();
        ws.set_cell_text(3, 4, "x").unwrap();

        assert_eq!(ws.get_value("A1").unwrap().as_string(), Some("SSCC"));
        assert_eq!(ws.get_value("D3").unwrap().as_string(), Some("x"));
        assert_eq!(ws.cell_text(3, 4), "x");
        assert_eq!(Grid::last_row(&ws), 3);
        assert_eq!(Grid::last_column(&ws), 4);
        assert_eq!(Grid::last_column_in_row(&ws, 1), 1);
        assert_eq!(Grid::last_column_in_row(&ws, 2), 0);
        assert_eq!(Grid::last_column_in_row(&ws, 0), 0);
    }

    #[test]
    fn test_cell_text_of_non_strings() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_value("A1", 42.0).unwrap();
        ws.set_cell_value("A2", true).unwrap();
        ws.set_cell_value("A3", 123456789012345678.0).unwrap();
        ws.set_cell_value_at(3, 0, CellValue::formula("=A1")).unwrap();

        assert_eq!(ws.cell_text(1, 1), "42");
        assert_eq!(ws.cell_text(2, 1), "TRUE");
        assert_eq!(ws.cell_text(3, 1), "1.2345678901234568E17");
        // A formula without a cached result shows nothing
        assert_eq!(ws.cell_text(4, 1), "");
    }

    #[test]
    fn test_zero_position_rejected() {
        let mut ws = Worksheet::new("Sheet1");
        assert!(matches!(ws.set_cell_text(0, 1, "x"), Err(Error::Grid(_))));
        assert!(matches!(ws.set_cell_text(1, 0, "x"), Err(Error::Grid(_))));
        assert_eq!(ws.cell_text(0, 0), "");
    }

    #[test]
    fn test_embed_image_does_not_extend_row() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_text(2, 1, "123456789012345678").unwrap();
        ws.embed_image(2, 2, Arc::from(&PNG[..]), PictureSize::new(80, 30))
            .unwrap();

        assert_eq!(ws.picture_count(), 1);
        assert_eq!(ws.pictures()[0].row(), 1);
        assert_eq!(ws.pictures()[0].col(), 1);
        assert_eq!(Grid::last_column_in_row(&ws, 2), 1);
    }

    #[test]
    fn test_embed_rejects_unknown_bytes() {
        let mut ws = Worksheet::new("Sheet1");
        let err = ws
            .embed_image(1, 1, Arc::from(&b"not an image"[..]), PictureSize::new(80, 30))
            .unwrap_err();
        assert!(matches!(err, Error::Grid(_)));
    }
}
