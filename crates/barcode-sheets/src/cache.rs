//! Per-run memo of composite images

use std::sync::Arc;

use ahash::AHashMap;

use crate::barcode::SynthesisError;
use crate::sscc::Sscc;

/// Composite images keyed by identifier.
///
/// Lives for one stamping run. Values are shared, so handing out a cached
/// image never copies its bytes.
#[derive(Debug, Default)]
pub struct BarcodeCache {
    images: AHashMap<Sscc, Arc<[u8]>>,
    hits: usize,
    misses: usize,
}

impl BarcodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the image for `sscc`, calling `create` only the first time.
    ///
    /// A failed `create` caches nothing.
    pub fn get_or_create<F>(
        &mut self,
        sscc: &Sscc,
        create: F,
    ) -> Result<Arc<[u8]>, SynthesisError>
    where
        F: FnOnce(&Sscc) -> Result<Vec<u8>, SynthesisError>,
    {
        if let Some(image) = self.images.get(sscc) {
            self.hits += 1;
            return Ok(Arc::clone(image));
        }

        log::debug!("rendering barcode for {}", sscc);
        let image: Arc<[u8]> = Arc::from(create(sscc)?);
        self.misses += 1;
        self.images.insert(sscc.clone(), Arc::clone(&image));
        Ok(image)
    }

    /// Cached image for `sscc`, if any
    pub fn get(&self, sscc: &Sscc) -> Option<&Arc<[u8]>> {
        self.images.get(sscc)
    }

    /// Number of distinct identifiers rendered
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Lookups answered from the cache
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Lookups that had to render
    pub fn misses(&self) -> usize {
        self.misses
    }
}
