//! Bold label typeface
//!
//! Labels are set in DejaVu Sans Bold, embedded in the binary so rendering
//! never depends on the fonts a host has installed. Sizes are given in
//! points and converted to pixels at 96 DPI.

use std::fmt;
use std::sync::OnceLock;

use fontdue::{Font, FontSettings};
use image::{GrayImage, Luma};

use super::SynthesisError;

static BOLD_TTF: &[u8] = include_bytes!("../../assets/DejaVuSans-Bold.ttf");

/// Points to pixels at 96 DPI
pub fn pt_to_px(size_pt: f32) -> f32 {
    size_pt * 4.0 / 3.0
}

/// The label typeface
#[derive(Clone, Copy)]
pub struct LabelFont {
    font: &'static Font,
}

impl fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelFont").finish_non_exhaustive()
    }
}

impl LabelFont {
    /// The embedded bold face, parsed once per process
    pub fn bold() -> Result<Self, SynthesisError> {
        static FONT: OnceLock<Result<Font, &'static str>> = OnceLock::new();
        FONT.get_or_init(|| Font::from_bytes(BOLD_TTF, FontSettings::default()))
            .as_ref()
            .map(|font| Self { font })
            .map_err(|e| SynthesisError::Font(*e))
    }

    /// Width of `text` in pixels: the sum of its glyph advances
    pub fn measure(&self, text: &str, size_pt: f32) -> f32 {
        let px = pt_to_px(size_pt);
        text.chars()
            .map(|c| self.font.metrics(c, px).advance_width)
            .sum()
    }

    /// Ascent and descent in pixels, both measured away from the baseline
    fn vertical_extent(&self, px: f32) -> (f32, f32) {
        match self.font.horizontal_line_metrics(px) {
            Some(line) => (line.ascent, -line.descent),
            None => (px, 0.0),
        }
    }

    /// Height of one line of text (ascent plus descent) in pixels
    pub fn line_height(&self, size_pt: f32) -> f32 {
        let (ascent, descent) = self.vertical_extent(pt_to_px(size_pt));
        ascent + descent
    }

    /// Draw `text` with the top-left corner of its line box at (`x`, `y`),
    /// clipped to the image. Glyph coverage is blended over the background.
    pub fn draw(
        &self,
        img: &mut GrayImage,
        text: &str,
        x: f32,
        y: f32,
        size_pt: f32,
        color: Luma<u8>,
    ) {
        let px = pt_to_px(size_pt);
        let (ascent, _) = self.vertical_extent(px);
        let baseline = y + ascent;
        let (width, height) = (i64::from(img.width()), i64::from(img.height()));

        let mut pen = x;
        for ch in text.chars() {
            let (metrics, coverage) = self.font.rasterize(ch, px);
            let left = (pen + metrics.xmin as f32).round() as i64;
            // ymin is the bitmap's bottom edge relative to the baseline, upwards positive
            let top = (baseline - metrics.ymin as f32 - metrics.height as f32).round() as i64;

            for (i, &alpha) in coverage.iter().enumerate() {
                if alpha == 0 {
                    continue;
                }
                let gx = left + (i % metrics.width) as i64;
                let gy = top + (i / metrics.width) as i64;
                if gx < 0 || gy < 0 || gx >= width || gy >= height {
                    continue;
                }
                let pixel = img.get_pixel_mut(gx as u32, gy as u32);
                pixel[0] = blend(pixel[0], color[0], alpha);
            }
            pen += metrics.advance_width;
        }
    }
}

fn blend(background: u8, ink: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    ((u32::from(background) * (255 - a) + u32::from(ink) * a + 127) / 255) as u8
}

/// Shrink a label size until `measure` fits `max_width`.
///
/// Starts at `start` and steps down by one point, never going below
/// `floor`. At the floor the size is returned even if it still overflows.
pub fn fit_font_size<F>(mut measure: F, max_width: f32, start: f32, floor: f32) -> f32
where
    F: FnMut(f32) -> f32,
{
    let mut size = start.max(floor);
    while size > floor && measure(size) > max_width {
        size = (size - 1.0).max(floor);
    }
    size
}
