/// The default number of frames to sample from each video. Higher numbers
/// catch slower loops but extend processing time (each sample is a separate
/// seek-and-decode).
///
/// Reccomended range: 3-30.
pub const DEFAULT_SAMPLE_COUNT: usize = 5;

/// The default number of near-identical adjacent sample pairs at which a
/// video is reported as spam. With the default of 5 samples there are 4
/// pairs, so a video is flagged when at least half of its sampled content
/// is static.
pub const DEFAULT_MAX_SAME_IMG: u32 = 2;

/// The default similarity threshold (percent of differing pixels) for the
/// binary strategy. A pair whose difference percentage is at or below this
/// value counts as near-identical.
pub const DEFAULT_BINARY_SIMILARITY_THRESHOLD: f64 = 10.0;

/// The default similarity threshold (percent of differing pixels) for the
/// perceptual strategy. The perceptual metric already absorbs codec noise
/// per pixel, so a much tighter percentage is appropriate.
pub const DEFAULT_PERCEPTUAL_SIMILARITY_THRESHOLD: f64 = 1.0;

/// The default per-channel slack for the binary strategy. Two decodes of the
/// same content rarely agree bit-for-bit after lossy compression, so a small
/// nonzero slack is the useful default. Set to 0 for a true exact match.
pub const DEFAULT_BINARY_CHANNEL_TOLERANCE: u8 = 3;

/// The default colour-distance above which the perceptual strategy counts a
/// pixel as visually different. Distances are measured in a gamma-corrected
/// luma/chroma space where channel values lie in [0, 1].
pub const DEFAULT_PERCEPTUAL_DISTANCE_THRESHOLD: f64 = 0.1;

/// The two available frame comparison strategies. Selected once when the
/// pipeline is constructed, never per pair.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum DiffStrategy {
    /// Per-pixel equality in the native colour representation, with a small
    /// configurable per-channel slack.
    Binary,
    /// Weighted colour-distance in a perceptually motivated colour space.
    Perceptual,
}

impl DiffStrategy {
    /// The default similarity threshold for this strategy. The two strategies
    /// produce very differently shaped difference percentages, so they carry
    /// distinct defaults.
    pub fn default_similarity_threshold(self) -> f64 {
        match self {
            Self::Binary => DEFAULT_BINARY_SIMILARITY_THRESHOLD,
            Self::Perceptual => DEFAULT_PERCEPTUAL_SIMILARITY_THRESHOLD,
        }
    }
}
