pub mod binary;
pub mod perceptual;

use image::{GrayImage, RgbImage};

use crate::{ClassifyResult, Error};

/// The outcome of comparing two equally-shaped frames: how many pixels
/// differ, out of how many, plus the per-pixel difference mask.
///
/// Recomputed per pair and never cached across files.
#[derive(Debug, Clone)]
pub struct DiffResult {
    differing: u64,
    total: u64,
    mask: GrayImage,
}

impl DiffResult {
    pub(crate) fn new(differing: u64, total: u64, mask: GrayImage) -> Self {
        debug_assert!(differing <= total);
        Self {
            differing,
            total,
            mask,
        }
    }

    /// The number of pixels judged to differ between the two frames.
    pub fn differing(&self) -> u64 {
        self.differing
    }

    /// The total number of compared pixels (width * height).
    pub fn total(&self) -> u64 {
        self.total
    }

    /// `100 * differing / total`, always in `[0, 100]`. A degenerate
    /// zero-pixel region compares as identical.
    pub fn difference_percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * (self.differing as f64) / (self.total as f64)
        }
    }

    /// The difference mask: 0 where the frames agree, 255 where they differ.
    pub fn mask(&self) -> &GrayImage {
        &self.mask
    }
}

/// A comparison strategy that reduces two equally-sized frames to a
/// differing-pixel count.
///
/// The strategy is chosen once at pipeline construction and injected into
/// the classifier as a dependency; per-pair code never switches on it.
pub trait Differ {
    /// Compare two frames of identical dimensions.
    ///
    /// # Errors
    /// The frames differ in raster size. Mismatched frames indicate a
    /// malformed source and are never silently resized or cropped.
    fn compare(&self, a: &RgbImage, b: &RgbImage) -> ClassifyResult<DiffResult>;
}

/// Shared precondition for every strategy.
pub(crate) fn check_dimensions(a: &RgbImage, b: &RgbImage) -> ClassifyResult<()> {
    if a.dimensions() == b.dimensions() {
        Ok(())
    } else {
        Err(Error::DimensionMismatch {
            expected: a.dimensions(),
            actual: b.dimensions(),
        })
    }
}

pub(crate) const MASK_SAME: u8 = 0;
pub(crate) const MASK_DIFFERS: u8 = 255;
