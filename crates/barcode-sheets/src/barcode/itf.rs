//! Interleaved 2 of 5 symbol encoding
//!
//! Digits are encoded in pairs: the first digit of a pair sets the widths of
//! five bars, the second the widths of the five spaces between them. Each
//! digit pattern has two wide and three narrow elements.

use image::{GrayImage, Luma};
use thiserror::Error;

/// Narrow element width in modules
const N: u8 = 1;
/// Wide element width in modules
const W: u8 = 3;

/// Bar, space, bar, space
const START_PATTERN: [u8; 4] = [N, N, N, N];
/// Bar, space, bar
const END_PATTERN: [u8; 3] = [W, N, N];

const DIGIT_PATTERNS: [[u8; 5]; 10] = [
    [N, N, W, W, N], // 0
    [W, N, N, N, W], // 1
    [N, W, N, N, W], // 2
    [W, W, N, N, N], // 3
    [N, N, W, N, W], // 4
    [W, N, W, N, N], // 5
    [N, W, W, N, N], // 6
    [N, N, N, W, W], // 7
    [W, N, N, W, N], // 8
    [N, W, N, W, N], // 9
];

/// Errors from encoding ITF data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItfError {
    #[error("ITF data is empty")]
    Empty,

    #[error("ITF needs an even number of digits, got {0}")]
    OddLength(usize),

    #[error("ITF accepts digits only, found {ch:?} at position {position}")]
    NonDigit { position: usize, ch: char },
}

/// An encoded symbol as a row of modules; `true` is a bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItfSymbol {
    modules: Vec<bool>,
}

impl ItfSymbol {
    /// Encode an even-length string of ASCII digits
    pub fn encode(data: &str) -> Result<Self, ItfError> {
        if data.is_empty() {
            return Err(ItfError::Empty);
        }
        let digits = data
            .chars()
            .enumerate()
            .map(|(position, ch)| {
                ch.to_digit(10)
                    .map(|d| d as usize)
                    .ok_or(ItfError::NonDigit { position, ch })
            })
            .collect::<Result<Vec<usize>, ItfError>>()?;
        if digits.len() % 2 != 0 {
            return Err(ItfError::OddLength(digits.len()));
        }

        let mut modules = Vec::with_capacity(4 + digits.len() * 9 + 5);
        append_pattern(&mut modules, &START_PATTERN);
        for pair in digits.chunks_exact(2) {
            let bars = &DIGIT_PATTERNS[pair[0]];
            let spaces = &DIGIT_PATTERNS[pair[1]];
            let mut interleaved = [0u8; 10];
            for i in 0..5 {
                interleaved[2 * i] = bars[i];
                interleaved[2 * i + 1] = spaces[i];
            }
            append_pattern(&mut modules, &interleaved);
        }
        append_pattern(&mut modules, &END_PATTERN);

        Ok(Self { modules })
    }

    /// Module pattern, left to right
    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    /// Symbol width in modules, without quiet zone
    pub fn width(&self) -> usize {
        self.modules.len()
    }

    /// Rasterize at the requested size.
    ///
    /// Modules are scaled by the largest whole factor that fits `width`
    /// together with `margin` quiet modules, and the result is centred. The
    /// image is never narrower than the symbol plus margin.
    pub fn render(&self, width: u32, height: u32, margin: u32) -> GrayImage {
        let code_width = self.modules.len() as u32;
        let full_width = code_width + margin;
        let output_width = width.max(full_width);
        let output_height = height.max(1);
        let scale = output_width / full_width;
        let left_padding = (output_width - code_width * scale) / 2;

        let mut img = GrayImage::from_pixel(output_width, output_height, Luma([255]));
        let mut x = left_padding;
        for &bar in &self.modules {
            if bar {
                for dx in 0..scale {
                    for y in 0..output_height {
                        img.put_pixel(x + dx, y, Luma([0]));
                    }
                }
            }
            x += scale;
        }
        img
    }
}

/// Push alternating runs, starting with a bar
fn append_pattern(modules: &mut Vec<bool>, pattern: &[u8]) {
    let mut color = true;
    for &width in pattern {
        modules.extend(std::iter::repeat(color).take(usize::from(width)));
        color = !color;
    }
}
