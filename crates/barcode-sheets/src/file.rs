//! Whole-file processing: load, stamp, save once

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use barcode_sheets_core::Workbook;
use barcode_sheets_xlsx::{XlsxError, XlsxReader, XlsxWriter};
use chrono::{Local, NaiveDateTime};

use crate::error::{Error, Result};
use crate::options::StampOptions;
use crate::stamp::{BarcodeStamper, StampReport};

/// Media type of the produced workbook
pub const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Prefix of every output file name
pub const OUTPUT_PREFIX: &str = "Barcode_";

/// A processed file
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    /// Where the stamped workbook was written
    pub path: PathBuf,
    pub report: StampReport,
}

/// Output file name for `input` stamped at `timestamp`: `Barcode_<stem>_<YYYYMMDD_HHMMSS>.xlsx`
pub fn output_file_name(input: &Path, timestamp: NaiveDateTime) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook".to_string());
    format!(
        "{}{}_{}.xlsx",
        OUTPUT_PREFIX,
        stem,
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// Read a workbook from disk
pub fn load_workbook(path: &Path) -> Result<Workbook> {
    let bytes = fs::read(path)?;
    XlsxReader::read(Cursor::new(bytes)).map_err(Error::Load)
}

/// Stamp `input` with default options; see [`process_file_with_options`]
pub fn process_file(input: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
    process_file_with_options(input, output_dir, &StampOptions::default()).map(|done| done.path)
}

/// Load `input`, stamp its first worksheet and write the result.
///
/// The output goes to `output_dir`, or next to the input when `None`. The
/// workbook is serialized in memory before anything touches the disk, so a
/// failed run leaves no output file.
pub fn process_file_with_options(
    input: &Path,
    output_dir: Option<&Path>,
    options: &StampOptions,
) -> Result<ProcessedFile> {
    log::info!("processing {}", input.display());
    let mut workbook = load_workbook(input)?;
    if workbook.sheet_count() > 1 {
        log::debug!(
            "{} worksheets; only the first is stamped",
            workbook.sheet_count()
        );
    }

    let sheet = workbook.worksheet_mut(0).ok_or(Error::EmptyWorkbook)?;
    let report = BarcodeStamper::new(options.clone()).stamp(sheet)?;

    let bytes = XlsxWriter::write_to_vec(&workbook).map_err(Error::Persistence)?;
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let path = dir.join(output_file_name(input, Local::now().naive_local()));
    fs::write(&path, bytes).map_err(|e| Error::Persistence(XlsxError::Io(e)))?;

    log::info!("wrote {}", path.display());
    Ok(ProcessedFile { path, report })
}
