//! Tunables for detection, rendering and stamping
//!
//! The defaults reproduce the standard layout: an "sscc" header within the
//! first 10 rows, or 3 identifiers among the first 50; a 500x150 ITF symbol
//! with a 40px label band; images shown at 80x30.

use barcode_sheets_core::PictureSize;

/// How the identifier column is located
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectorOptions {
    /// Header text that marks the column (trimmed, case-insensitive)
    pub header_name: String,
    /// Rows searched for the header
    pub header_rows: u32,
    /// Rows sampled per column by the statistical scan
    pub sample_rows: u32,
    /// Identifiers a column needs among its sampled rows
    pub min_matches: usize,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            header_name: "sscc".to_string(),
            header_rows: 10,
            sample_rows: 50,
            min_matches: 3,
        }
    }
}

/// Geometry and typography of the composite barcode image
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderOptions {
    /// Requested symbol width in pixels
    pub barcode_width: u32,
    /// Symbol height in pixels
    pub barcode_height: u32,
    /// Quiet zone in modules, split between both sides
    pub margin: u32,
    /// Height of the label band under the symbol
    pub label_height: u32,
    /// Horizontal room the label must leave free
    pub label_padding: u32,
    /// Label size to try first, in points
    pub font_size: f32,
    /// Smallest label size, in points
    pub min_font_size: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            barcode_width: 500,
            barcode_height: 150,
            margin: 2,
            label_height: 40,
            label_padding: 4,
            font_size: 18.0,
            min_font_size: 8.0,
        }
    }
}

/// Everything a stamping run needs
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StampOptions {
    /// Text of the header cell written to row 1
    pub header_text: String,
    /// Displayed size of every embedded image, in pixels
    pub display_size: PictureSize,
    pub detector: DetectorOptions,
    pub render: RenderOptions,
}

impl Default for StampOptions {
    fn default() -> Self {
        Self {
            header_text: "Barcode".to_string(),
            display_size: PictureSize::new(80, 30),
            detector: DetectorOptions::default(),
            render: RenderOptions::default(),
        }
    }
}
