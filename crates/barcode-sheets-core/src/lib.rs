//! # barcode-sheets-core
//!
//! In-memory worksheet model used by the barcode-sheets pipeline.
//!
//! This crate provides the types the rest of the workspace builds on:
//! - [`CellValue`] - Represents cell values (numbers, strings, booleans, errors, formulas)
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`Picture`] - An image anchored at a cell with a fixed display size
//! - [`Stylesheet`] - The workbook's cell formats, referenced by index from cells
//! - [`Workbook`], [`Worksheet`] - The document structures
//!
//! ## Example
//!
//! ```rust
//! use barcode_sheets_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! // Using string addresses
//! sheet.set_cell_value("A1", "SSCC").unwrap();
//! sheet.set_cell_value("A2", "003123456789012345").unwrap();
//!
//! // Or using row/column indices (0-based)
//! sheet.set_cell_value_at(1, 1, CellValue::Number(12.5)).unwrap();
//! assert_eq!(sheet.last_column_in_row(1), Some(1));
//! ```

pub mod cell;
pub mod error;
pub mod picture;
pub mod style;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{CellAddress, CellData, CellError, CellRange, CellValue, SharedString};
pub use error::{Error, Result};
pub use picture::{ImageFormat, Picture, PictureSize};
pub use style::Stylesheet;
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
