use image::{GrayImage, Luma, RgbImage};

use crate::definitions::DEFAULT_BINARY_CHANNEL_TOLERANCE;
use crate::ClassifyResult;

use super::{check_dimensions, DiffResult, Differ, MASK_DIFFERS, MASK_SAME};

/// Exact-match comparison in the image's native colour representation.
///
/// A pixel counts as differing iff any channel differs by more than
/// `channel_tolerance`. The default slack of a few code values absorbs codec
/// rounding between two independently decoded frames; with a tolerance of 0
/// this is a true bit-exact comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryDiffer {
    channel_tolerance: u8,
}

impl BinaryDiffer {
    pub fn new(channel_tolerance: u8) -> Self {
        Self { channel_tolerance }
    }

    /// A comparison with no slack at all. Decoded video frames virtually
    /// never match bit-for-bit, so this is mostly useful on synthetic images.
    pub fn exact() -> Self {
        Self::new(0)
    }

    pub fn channel_tolerance(&self) -> u8 {
        self.channel_tolerance
    }
}

impl Default for BinaryDiffer {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY_CHANNEL_TOLERANCE)
    }
}

impl Differ for BinaryDiffer {
    fn compare(&self, a: &RgbImage, b: &RgbImage) -> ClassifyResult<DiffResult> {
        check_dimensions(a, b)?;

        let (width, height) = a.dimensions();
        let mut mask = GrayImage::from_pixel(width, height, Luma([MASK_SAME]));
        let mut differing = 0u64;

        for (x, y, pix_a) in a.enumerate_pixels() {
            let pix_b = b.get_pixel(x, y);

            let differs = pix_a
                .0
                .iter()
                .zip(pix_b.0.iter())
                .any(|(ch_a, ch_b)| ch_a.abs_diff(*ch_b) > self.channel_tolerance);

            if differs {
                mask.put_pixel(x, y, Luma([MASK_DIFFERS]));
                differing += 1;
            }
        }

        let total = u64::from(width) * u64::from(height);

        Ok(DiffResult::new(differing, total, mask))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Error;

    fn rgb_from_bytes(width: u32, height: u32, bytes: Vec<u8>) -> RgbImage {
        RgbImage::from_raw(width, height, bytes).unwrap()
    }

    #[test]
    fn test_binary_identical_images_have_zero_differing() {
        #[rustfmt::skip]
        let pixs = vec![
             10,  20,  30,    40,  50,  60,
             70,  80,  90,   100, 110, 120,
        ];
        let img = rgb_from_bytes(2, 2, pixs);

        let result = BinaryDiffer::exact().compare(&img, &img).unwrap();

        assert_eq!(result.differing(), 0);
        assert_eq!(result.total(), 4);
        assert_eq!(result.difference_percentage(), 0.0);
        assert!(result.mask().pixels().all(|p| p.0[0] == MASK_SAME));
    }

    #[test]
    fn test_binary_counts_each_differing_pixel_once() {
        #[rustfmt::skip]
        let pixs_a = vec![
              0,   0,   0,   255, 255, 255,
            100, 100, 100,    50,  50,  50,
        ];
        //second and fourth pixels changed (fourth in one channel only)
        #[rustfmt::skip]
        let pixs_b = vec![
              0,   0,   0,     0,   0,   0,
            100, 100, 100,    50,  50, 250,
        ];
        let a = rgb_from_bytes(2, 2, pixs_a);
        let b = rgb_from_bytes(2, 2, pixs_b);

        let result = BinaryDiffer::exact().compare(&a, &b).unwrap();

        assert_eq!(result.differing(), 2);
        assert_eq!(result.difference_percentage(), 50.0);
        assert_eq!(result.mask().get_pixel(1, 0).0[0], MASK_DIFFERS);
        assert_eq!(result.mask().get_pixel(1, 1).0[0], MASK_DIFFERS);
        assert_eq!(result.mask().get_pixel(0, 0).0[0], MASK_SAME);
    }

    #[test]
    fn test_binary_is_symmetric() {
        #[rustfmt::skip]
        let pixs_a = vec![
             12,  13,  14,    15,  16,  17,
             18,  19,  20,    21,  22,  23,
        ];
        #[rustfmt::skip]
        let pixs_b = vec![
             12,  13,  14,   200, 201, 202,
             18,  19,  20,    21,  22,  23,
        ];
        let a = rgb_from_bytes(2, 2, pixs_a);
        let b = rgb_from_bytes(2, 2, pixs_b);

        let differ = BinaryDiffer::default();
        let ab = differ.compare(&a, &b).unwrap();
        let ba = differ.compare(&b, &a).unwrap();

        assert_eq!(ab.differing(), ba.differing());
        assert_eq!(ab.total(), ba.total());
    }

    #[test]
    fn test_binary_tolerance_absorbs_codec_rounding() {
        let a = RgbImage::from_pixel(4, 4, image::Rgb([100, 100, 100]));
        let b = RgbImage::from_pixel(4, 4, image::Rgb([103, 98, 101]));

        //within the default slack of 3 code values
        let close = BinaryDiffer::default().compare(&a, &b).unwrap();
        assert_eq!(close.differing(), 0);

        //an exact comparison sees every pixel as different
        let exact = BinaryDiffer::exact().compare(&a, &b).unwrap();
        assert_eq!(exact.differing(), 16);
    }

    #[test]
    fn test_binary_rejects_dimension_mismatch() {
        let a = RgbImage::new(2, 2);
        let b = RgbImage::new(2, 3);

        let result = BinaryDiffer::default().compare(&a, &b);

        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                expected: (2, 2),
                actual: (2, 3)
            })
        ));
    }
}
