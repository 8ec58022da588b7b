use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::definitions::DEFAULT_PERCEPTUAL_DISTANCE_THRESHOLD;
use crate::ClassifyResult;

use super::{check_dimensions, DiffResult, Differ, MASK_DIFFERS, MASK_SAME};

/// Perceptual colour-distance comparison.
///
/// Each pixel is gamma-expanded from its stored sRGB value and converted to
/// an opponent luma/chroma space (NTSC YIQ weights). A pixel counts as
/// differing iff the weighted Euclidean distance between the two colours
/// exceeds `distance_threshold`. Compared to the binary strategy this
/// tolerates uniform codec noise while remaining sensitive to genuine
/// content changes.
///
/// With `antialiasing` enabled, a smoothing pass additionally clears
/// differences that are a single isolated pixel surrounded by agreeing
/// neighbours. Sub-pixel text rendering and edge antialiasing produce lots
/// of such one-pixel disagreements that say nothing about the content.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct PerceptualDiffer {
    /// Exponent used to expand stored channel values to linear light.
    /// 2.2 approximates the sRGB transfer curve.
    pub gamma: f64,

    /// Weight applied to the luma component of the colour distance. The eye
    /// is most sensitive to luminance changes, so this is normally the
    /// largest weight.
    pub luminance_weight: f64,

    /// Weight applied to the two chroma components of the colour distance.
    pub chroma_weight: f64,

    /// Colour distance above which two pixels are considered visually
    /// different. Channel values are in [0, 1] after gamma expansion.
    pub distance_threshold: f64,

    /// Suppress isolated single-pixel differences likely caused by sub-pixel
    /// rendering.
    pub antialiasing: bool,
}

impl Default for PerceptualDiffer {
    fn default() -> Self {
        Self {
            gamma: 2.2,
            luminance_weight: 1.0,
            chroma_weight: 0.25,
            distance_threshold: DEFAULT_PERCEPTUAL_DISTANCE_THRESHOLD,
            antialiasing: true,
        }
    }
}

impl PerceptualDiffer {
    fn colour_distance(&self, a: &Rgb<u8>, b: &Rgb<u8>) -> f64 {
        let (ya, ia, qa) = self.yiq(a);
        let (yb, ib, qb) = self.yiq(b);

        let dy = ya - yb;
        let di = ia - ib;
        let dq = qa - qb;

        let dist_sq =
            self.luminance_weight * dy * dy + self.chroma_weight * (di * di + dq * dq);

        dist_sq.sqrt()
    }

    fn yiq(&self, pix: &Rgb<u8>) -> (f64, f64, f64) {
        let linear = |ch: u8| (f64::from(ch) / 255.0).powf(self.gamma);

        let r = linear(pix.0[0]);
        let g = linear(pix.0[1]);
        let b = linear(pix.0[2]);

        let y = 0.299 * r + 0.587 * g + 0.114 * b;
        let i = 0.596 * r - 0.274 * g - 0.322 * b;
        let q = 0.211 * r - 0.523 * g + 0.312 * b;

        (y, i, q)
    }
}

impl Differ for PerceptualDiffer {
    fn compare(&self, a: &RgbImage, b: &RgbImage) -> ClassifyResult<DiffResult> {
        check_dimensions(a, b)?;

        let (width, height) = a.dimensions();
        let mut mask = GrayImage::from_pixel(width, height, Luma([MASK_SAME]));

        for (x, y, pix_a) in a.enumerate_pixels() {
            let pix_b = b.get_pixel(x, y);

            if self.colour_distance(pix_a, pix_b) > self.distance_threshold {
                mask.put_pixel(x, y, Luma([MASK_DIFFERS]));
            }
        }

        if self.antialiasing {
            mask = suppress_isolated_pixels(&mask);
        }

        let differing = mask.pixels().filter(|p| p.0[0] == MASK_DIFFERS).count() as u64;
        let total = u64::from(width) * u64::from(height);

        Ok(DiffResult::new(differing, total, mask))
    }
}

//Clear mask pixels whose 8-neighbour window contains no other differing
//pixel. Neighbour lookups read the unsmoothed input mask, so the result does
//not depend on scan order.
fn suppress_isolated_pixels(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut smoothed = mask.clone();

    for (x, y, pix) in mask.enumerate_pixels() {
        if pix.0[0] != MASK_DIFFERS {
            continue;
        }

        let mut has_differing_neighbour = false;
        'neighbours: for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }

                let nx = i64::from(x) + dx;
                let ny = i64::from(y) + dy;
                if nx < 0 || ny < 0 || nx >= i64::from(width) || ny >= i64::from(height) {
                    continue;
                }

                if mask.get_pixel(nx as u32, ny as u32).0[0] == MASK_DIFFERS {
                    has_differing_neighbour = true;
                    break 'neighbours;
                }
            }
        }

        if !has_differing_neighbour {
            smoothed.put_pixel(x, y, Luma([MASK_SAME]));
        }
    }

    smoothed
}
