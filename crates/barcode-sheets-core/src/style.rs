//! Workbook-level cell formats
//!
//! Cells refer to formats by index into the stylesheet's `cellXfs` list.
//! The stylesheet itself (number formats, fonts, fills, borders and the
//! cell format records) is kept as the package stored it, so a workbook
//! read from disk is written back with every format intact.

/// The stylesheet part of a workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    xml: String,
    cell_format_count: u32,
}

impl Stylesheet {
    /// Wrap a stylesheet document holding `cell_format_count` cell formats
    pub fn new<S: Into<String>>(xml: S, cell_format_count: u32) -> Self {
        Self {
            xml: xml.into(),
            cell_format_count,
        }
    }

    /// The stylesheet document
    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// Number of cell formats (`cellXfs` entries)
    pub fn cell_format_count(&self) -> u32 {
        self.cell_format_count
    }

    /// Check whether a cell style index refers to a format in this stylesheet
    pub fn contains(&self, style_index: u32) -> bool {
        style_index < self.cell_format_count
    }
}
