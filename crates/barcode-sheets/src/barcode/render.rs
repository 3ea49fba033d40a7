//! Composite barcode + label rendering

use image::codecs::png::PngEncoder;
use image::{imageops, ExtendedColorType, GrayImage, ImageEncoder, Luma};

use super::font::{fit_font_size, LabelFont};
use super::itf::ItfSymbol;
use super::{Synthesize, SynthesisError};
use crate::options::RenderOptions;
use crate::sscc::Sscc;

const WHITE: Luma<u8> = Luma([255]);
const BLACK: Luma<u8> = Luma([0]);

/// Renders an ITF symbol with its human-readable digits underneath
#[derive(Debug, Clone, Default)]
pub struct BarcodeRenderer {
    options: RenderOptions,
}

impl BarcodeRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Label size in points that fits `text` into a canvas `canvas_width` wide
    pub fn label_size(&self, text: &str, canvas_width: u32) -> Result<f32, SynthesisError> {
        let font = LabelFont::bold()?;
        Ok(self.fit_label(&font, text, canvas_width))
    }

    fn fit_label(&self, font: &LabelFont, text: &str, canvas_width: u32) -> f32 {
        let max_width = canvas_width.saturating_sub(self.options.label_padding) as f32;
        fit_font_size(
            |size| font.measure(text, size),
            max_width,
            self.options.font_size,
            self.options.min_font_size,
        )
    }

    /// Symbol on top, label band below, on a white canvas
    pub fn compose(&self, data: &str) -> Result<GrayImage, SynthesisError> {
        let opts = &self.options;
        let symbol = ItfSymbol::encode(data)?;
        let font = LabelFont::bold()?;
        let bars = symbol.render(opts.barcode_width, opts.barcode_height, opts.margin);

        let width = bars.width();
        let band_top = bars.height();
        let mut canvas = GrayImage::from_pixel(width, band_top + opts.label_height, WHITE);
        imageops::replace(&mut canvas, &bars, 0, 0);

        let size = self.fit_label(&font, data, width);
        let text_width = font.measure(data, size);
        let x = (width as f32 - text_width) / 2.0;
        let y = band_top as f32 + (opts.label_height as f32 - font.line_height(size)) / 2.0;
        font.draw(&mut canvas, data, x, y, size, BLACK);

        log::trace!(
            "composed {} at {}x{} with {}pt label",
            data,
            width,
            canvas.height(),
            size
        );
        Ok(canvas)
    }

    /// Composite image as PNG bytes
    pub fn render_png(&self, data: &str) -> Result<Vec<u8>, SynthesisError> {
        let canvas = self.compose(data)?;
        let mut out = Vec::new();
        PngEncoder::new(&mut out).write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            ExtendedColorType::L8,
        )?;
        Ok(out)
    }
}

impl Synthesize for BarcodeRenderer {
    fn synthesize(&self, sscc: &Sscc) -> Result<Vec<u8>, SynthesisError> {
        self.render_png(sscc.as_str())
    }
}
