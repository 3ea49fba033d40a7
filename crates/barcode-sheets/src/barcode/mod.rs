//! Barcode image synthesis: ITF symbol, label font, composite PNG

pub mod font;
pub mod itf;
mod render;

use thiserror::Error;

use crate::sscc::Sscc;

pub use font::{fit_font_size, LabelFont};
pub use itf::{ItfError, ItfSymbol};
pub use render::BarcodeRenderer;

/// Errors while producing a composite barcode image
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The data cannot be encoded as ITF
    #[error("ITF encoding failed: {0}")]
    Encode(#[from] ItfError),

    /// The embedded label typeface could not be loaded
    #[error("label font unavailable: {0}")]
    Font(&'static str),

    /// The canvas could not be encoded as PNG
    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// Produces the encoded composite image for one identifier
pub trait Synthesize {
    fn synthesize(&self, sscc: &Sscc) -> Result<Vec<u8>, SynthesisError>;
}
