use std::path::PathBuf;
use std::time::Duration;

use ffmpeg_frame_grab::FfmpegError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for the various reasons why a video could not be classified.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum Error {
    /// The file is not recognized as a video.
    #[error("File is not a video")]
    NotVideo,

    /// The file could not be opened/probed at all. Fatal for this file; batch
    /// runs skip it and continue with the next file.
    #[error("Failed to open video: {src_path}")]
    Open { src_path: PathBuf, error: FfmpegError },

    /// Seek/decode failure at a specific timestamp. Fatal for this file's
    /// classification; the remaining samples are abandoned.
    #[error("Failed to decode frame at {}s: {error}", timestamp.as_secs_f64())]
    Decode { timestamp: Duration, error: FfmpegError },

    /// Two compared frames differ in raster size. This indicates a malformed
    /// source (e.g a mid-stream resolution change) and is never papered over
    /// by resizing.
    #[error("Frame dimension mismatch: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch { expected: (u32, u32), actual: (u32, u32) },

    /// The probed duration was zero, so no timestamps can be sampled.
    #[error("Video has zero duration")]
    EmptyVideo,

    /// Invalid configuration (zero sample count, out-of-range thresholds).
    /// Rejected before any file is opened.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
