//! The stamping run: detect, render, embed

use crate::barcode::{BarcodeRenderer, Synthesize};
use crate::cache::BarcodeCache;
use crate::detect::{ColumnDetector, Detection};
use crate::error::Result;
use crate::grid::Grid;
use crate::options::StampOptions;
use crate::sscc::Sscc;

/// Outcome of one stamping run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampReport {
    /// Where the identifiers were found
    pub detection: Detection,
    /// 1-based column of the header cell
    pub header_column: u32,
    /// Rows examined
    pub rows_scanned: u32,
    /// Images anchored into the grid
    pub images_embedded: usize,
    /// Rows without a valid identifier
    pub rows_skipped: usize,
    /// Identifiers rendered
    pub distinct_identifiers: usize,
    /// Rows that reused an already rendered image
    pub cache_hits: usize,
}

/// Adds a barcode image next to every row that carries an identifier.
///
/// The header cell goes to row 1 right after the last used column of the
/// whole sheet; each image goes right after the last used column of its own
/// row, so rows of differing widths get images in differing columns.
#[derive(Debug, Clone)]
pub struct BarcodeStamper<S = BarcodeRenderer> {
    options: StampOptions,
    synthesizer: S,
}

impl BarcodeStamper<BarcodeRenderer> {
    pub fn new(options: StampOptions) -> Self {
        let renderer = BarcodeRenderer::new(options.render.clone());
        Self::with_synthesizer(options, renderer)
    }
}

impl Default for BarcodeStamper<BarcodeRenderer> {
    fn default() -> Self {
        Self::new(StampOptions::default())
    }
}

impl<S: Synthesize> BarcodeStamper<S> {
    /// Use a custom image source instead of the built-in renderer
    pub fn with_synthesizer(options: StampOptions, synthesizer: S) -> Self {
        Self {
            options,
            synthesizer,
        }
    }

    pub fn options(&self) -> &StampOptions {
        &self.options
    }

    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    /// Stamp `grid` in place.
    ///
    /// Fails without touching the grid if no identifier column is found. A
    /// rendering failure aborts the run with whatever was already written
    /// left in place; callers persist only on success.
    pub fn stamp<G: Grid + ?Sized>(&self, grid: &mut G) -> Result<StampReport> {
        let detection = ColumnDetector::new(self.options.detector.clone()).detect(&*grid)?;
        log::info!("SSCC column: {}", detection);

        let column = detection.column;
        let last_row = grid.last_row();
        let header_column = grid.last_column() + 1;

        if self.has_header(&*grid) {
            log::warn!(
                "row 1 already has a {:?} column; adding another",
                self.options.header_text
            );
        }
        grid.set_cell_text(1, header_column, &self.options.header_text)?;
        log::info!(
            "header {:?} in column {}",
            self.options.header_text,
            header_column
        );

        let mut cache = BarcodeCache::new();
        let mut images_embedded = 0;
        let mut rows_skipped = 0;

        for row in 1..=last_row {
            let Some(sscc) = Sscc::extract(&grid.cell_text(row, column)) else {
                log::trace!("row {}: no identifier", row);
                rows_skipped += 1;
                continue;
            };

            let image = cache.get_or_create(&sscc, |s| self.synthesizer.synthesize(s))?;
            let target = grid.last_column_in_row(row) + 1;
            grid.embed_image(row, target, image, self.options.display_size)?;
            log::debug!("row {}: {} at column {}", row, sscc, target);
            images_embedded += 1;
        }

        let report = StampReport {
            detection,
            header_column,
            rows_scanned: last_row,
            images_embedded,
            rows_skipped,
            distinct_identifiers: cache.len(),
            cache_hits: cache.hits(),
        };
        log::info!(
            "embedded {} images for {} identifiers, skipped {} rows",
            report.images_embedded,
            report.distinct_identifiers,
            report.rows_skipped
        );
        Ok(report)
    }

    fn has_header<G: Grid + ?Sized>(&self, grid: &G) -> bool {
        let header = self.options.header_text.trim();
        (1..=grid.last_column_in_row(1))
            .any(|col| grid.cell_text(1, col).trim().eq_ignore_ascii_case(header))
    }
}
