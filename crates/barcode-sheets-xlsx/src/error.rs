//! Errors raised while loading or saving a workbook package

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur during XLSX reading/writing
#[derive(Debug, Error)]
pub enum XlsxError {
    /// The package file could not be opened, read or written
    #[error("workbook file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The ZIP container is damaged or could not be assembled
    #[error("workbook archive is unreadable: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A part's XML is malformed
    #[error("malformed part XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The archive is not a spreadsheet package this crate can carry through
    #[error("not a workbook package: {0}")]
    InvalidFormat(String),

    /// A part named by the workbook or its relationships is absent
    #[error("workbook part '{0}' is missing")]
    MissingPart(String),

    /// A `<c r="...">` reference could not be parsed
    #[error("cell reference '{reference}' is not valid: {source}")]
    CellReference {
        reference: String,
        #[source]
        source: barcode_sheets_core::Error,
    },

    /// A cell refers to an entry the shared string table does not hold
    #[error("shared string index '{0}' is not in the string table")]
    SharedString(String),

    /// The worksheet model rejected content from the package
    #[error("worksheet rejected package content: {0}")]
    Model(#[from] barcode_sheets_core::Error),
}
