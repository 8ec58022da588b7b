use std::time::Duration;

use ffmpeg_frame_grab::VideoSource;
use image::RgbImage;

use crate::Error;

/// Abstraction over a decoded video that can produce a raster image for any
/// timestamp within its duration.
///
/// The real implementation is [`ffmpeg_frame_grab::VideoSource`]; tests use
/// synthetic in-memory sources so the sampling and classification logic can
/// be exercised without ffmpeg.
pub trait FrameSource {
    /// The total playable length of the video. Must be nonzero for sampling
    /// to proceed.
    fn duration(&self) -> Duration;

    /// Decode the frame nearest to `timestamp`.
    ///
    /// Takes `&mut self` so that implementations may carry decoder state
    /// between calls.
    fn frame_at(&mut self, timestamp: Duration) -> Result<RgbImage, Error>;
}

impl FrameSource for VideoSource {
    fn duration(&self) -> Duration {
        VideoSource::duration(self)
    }

    fn frame_at(&mut self, timestamp: Duration) -> Result<RgbImage, Error> {
        VideoSource::frame_at(self, timestamp).map_err(|error| Error::Decode { timestamp, error })
    }
}
