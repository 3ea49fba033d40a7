//! # barcode-sheets-xlsx
//!
//! XLSX (Office Open XML) reader and writer for barcode-sheets.
//!
//! Covers what the barcode pipeline needs to carry a workbook through a
//! load/save cycle: cell values and their formats, the workbook stylesheet,
//! row and column dimensions, merged regions and pictures anchored through
//! DrawingML parts.

pub mod error;
pub mod reader;
pub mod writer;

mod package;
mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
