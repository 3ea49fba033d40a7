//! Error types for the barcode pipeline

use barcode_sheets_xlsx::XlsxError;
use thiserror::Error;

use crate::barcode::SynthesisError;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a pipeline run
#[derive(Debug, Error)]
pub enum Error {
    /// Neither a header nor enough 18-digit values point at an identifier column
    #[error("No SSCC column found: no \"sscc\" header and no column with enough 18-digit values")]
    ColumnNotFound,

    /// A value that had to be an identifier is not one
    #[error("Invalid identifier: {0:?} (expected exactly 18 digits)")]
    InvalidIdentifier(String),

    /// Encoding or rasterizing a barcode failed
    #[error("Barcode image synthesis failed: {0}")]
    ImageSynthesis(#[from] SynthesisError),

    /// The input could not be parsed as a workbook
    #[error("Failed to load workbook: {0}")]
    Load(#[source] XlsxError),

    /// The output workbook could not be serialized or written
    #[error("Failed to save workbook: {0}")]
    Persistence(#[source] XlsxError),

    /// The worksheet rejected a write
    #[error("Grid error: {0}")]
    Grid(#[from] barcode_sheets_core::Error),

    /// The workbook has no worksheet to process
    #[error("Workbook has no worksheets")]
    EmptyWorkbook,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
