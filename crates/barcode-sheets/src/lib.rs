//! # barcode-sheets
//!
//! Finds the SSCC column of a spreadsheet and embeds an ITF barcode image
//! next to every row that carries an 18-digit identifier.
//!
//! A run:
//!
//! 1. locates the identifier column, by an `sscc` header in the first 10 rows
//!    or else by the leftmost column with 3 identifiers in its first 50 rows;
//! 2. writes a `Barcode` header into row 1, after the sheet's last used column;
//! 3. renders each distinct identifier once (symbol plus digits, as PNG);
//! 4. anchors the image after the last used cell of its row, shown at 80x30;
//! 5. saves the workbook once.
//!
//! ## Example
//!
//! ```rust
//! use barcode_sheets::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", "SSCC").unwrap();
//! sheet.set_cell_value("A2", "003123456789012345").unwrap();
//!
//! let report = BarcodeStamper::default().stamp(sheet).unwrap();
//! assert_eq!(report.images_embedded, 1);
//! assert_eq!(sheet.get_value("B1").unwrap().as_string(), Some("Barcode"));
//!
//! let bytes = XlsxWriter::write_to_vec(&workbook).unwrap();
//! assert!(!bytes.is_empty());
//! ```

pub mod barcode;
pub mod cache;
pub mod detect;
pub mod error;
pub mod file;
pub mod grid;
pub mod options;
pub mod prelude;
pub mod sscc;
pub mod stamp;

pub use barcode::{BarcodeRenderer, ItfError, ItfSymbol, Synthesize, SynthesisError};
pub use cache::BarcodeCache;
pub use detect::{ColumnDetector, Detection, DetectionPhase};
pub use error::{Error, Result};
pub use file::{
    load_workbook, output_file_name, process_file, process_file_with_options, ProcessedFile,
    XLSX_MIME_TYPE,
};
pub use grid::Grid;
pub use options::{DetectorOptions, RenderOptions, StampOptions};
pub use sscc::Sscc;
pub use stamp::{BarcodeStamper, StampReport};

// Re-export the worksheet model and its XLSX I/O
pub use barcode_sheets_core::{CellValue, Picture, PictureSize, Workbook, Worksheet};
pub use barcode_sheets_xlsx::{XlsxError, XlsxReader, XlsxWriter};
