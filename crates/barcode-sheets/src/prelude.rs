//! Prelude module - common imports for barcode-sheets users
//!
//! ```rust
//! use barcode_sheets::prelude::*;
//! ```

pub use crate::{
    // Pipeline
    BarcodeStamper,
    ColumnDetector,
    Detection,
    DetectionPhase,
    // Options
    DetectorOptions,
    Error,
    Grid,
    RenderOptions,
    Result,
    Sscc,
    StampOptions,
    StampReport,
    // Model and I/O
    Workbook,
    Worksheet,
    XlsxReader,
    XlsxWriter,
};
