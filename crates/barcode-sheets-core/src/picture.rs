//! Pictures anchored to worksheet cells

use std::sync::Arc;

use crate::cell::CellAddress;
use crate::error::{Error, Result};

/// English Metric Units per screen pixel at 96 DPI
pub const EMU_PER_PIXEL: u64 = 9525;

/// Raster format of a picture's encoded bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    /// Sniff the format from the leading magic bytes
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else {
            None
        }
    }

    /// Guess the format from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            _ => None,
        }
    }

    /// File extension used for the media part
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
        }
    }

    /// MIME type registered in the package content types
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
        }
    }
}

/// Display size of a picture in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PictureSize {
    pub width: u32,
    pub height: u32,
}

impl PictureSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width in EMU
    pub fn width_emu(&self) -> u64 {
        self.width as u64 * EMU_PER_PIXEL
    }

    /// Height in EMU
    pub fn height_emu(&self) -> u64 {
        self.height as u64 * EMU_PER_PIXEL
    }

    /// Build a size from EMU extents, rounding to the nearest pixel
    pub fn from_emu(cx: u64, cy: u64) -> Self {
        let px = |emu: u64| ((emu + EMU_PER_PIXEL / 2) / EMU_PER_PIXEL) as u32;
        Self::new(px(cx), px(cy))
    }
}

/// An image floating over a worksheet, with its top-left corner on a cell.
///
/// The encoded bytes are shared, so many pictures of the same image cost a
/// single allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    /// Anchor cell (0-based)
    pub anchor: CellAddress,
    /// Encoded image bytes
    pub data: Arc<[u8]>,
    /// Format of `data`
    pub format: ImageFormat,
    /// Display size, independent of the pixel size of `data`
    pub size: PictureSize,
}

impl Picture {
    /// Create a picture, detecting the format from the bytes.
    pub fn new(anchor: CellAddress, data: Arc<[u8]>, size: PictureSize) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::InvalidPicture("no image data".into()));
        }
        if size.width == 0 || size.height == 0 {
            return Err(Error::InvalidPicture(format!(
                "zero display size {}x{} at {}",
                size.width, size.height, anchor
            )));
        }
        let format = ImageFormat::detect(&data).ok_or_else(|| {
            Error::InvalidPicture(format!("unrecognized image format at {}", anchor))
        })?;

        Ok(Self {
            anchor,
            data,
            format,
            size,
        })
    }

    /// Anchor row (0-based)
    pub fn row(&self) -> u32 {
        self.anchor.row
    }

    /// Anchor column (0-based)
    pub fn col(&self) -> u16 {
        self.anchor.col
    }
}
