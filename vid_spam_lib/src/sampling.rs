use std::time::Duration;

use image::RgbImage;

use crate::{ClassifyResult, Error, FrameSource};

/// Compute `n` evenly spaced sample timestamps covering `duration`.
///
/// The i-th of `n` samples (0-indexed) is the midpoint of the i-th equal
/// sub-interval, i.e `(i + 0.5) * duration / n`. Sampling midpoints rather
/// than interval edges avoids the boundary artifacts of timestamp 0 and the
/// exact end of the stream (black lead-in frames, keyframe seeking errors).
///
/// The returned timestamps are strictly increasing and all lie strictly
/// inside `(0, duration)`.
///
/// # Errors
/// * `n == 0` is invalid configuration.
/// * A zero duration leaves nothing to sample.
pub fn sample_timestamps(duration: Duration, n: usize) -> ClassifyResult<Vec<Duration>> {
    if n == 0 {
        return Err(Error::Config("sample count must be at least 1".to_string()));
    }

    if duration.is_zero() {
        return Err(Error::EmptyVideo);
    }

    let interval_secs = duration.as_secs_f64() / n as f64;

    let timestamps = (0..n)
        .map(|i| Duration::from_secs_f64((i as f64 + 0.5) * interval_secs))
        .collect();

    Ok(timestamps)
}

/// A lazy, single-pass sequence of sampled frames in ascending timestamp
/// order.
///
/// Frames are decoded one at a time as the iterator is driven, so memory
/// stays bounded at O(1) frames no matter how many samples are requested.
/// If decoding fails at any timestamp the error is yielded once and the
/// iterator fuses; the remaining samples are abandoned.
pub struct FrameSampler<'a, S> {
    source: &'a mut S,
    timestamps: std::vec::IntoIter<Duration>,
    failed: bool,
}

impl<'a, S: FrameSource> FrameSampler<'a, S> {
    /// Plan `n` samples across the source's duration.
    ///
    /// # Errors
    /// Invalid `n` or a zero-duration source are rejected here, before any
    /// decoding starts.
    pub fn new(source: &'a mut S, n: usize) -> ClassifyResult<Self> {
        let timestamps = sample_timestamps(source.duration(), n)?;

        Ok(Self {
            source,
            timestamps: timestamps.into_iter(),
            failed: false,
        })
    }
}

impl<S: FrameSource> Iterator for FrameSampler<'_, S> {
    type Item = ClassifyResult<(Duration, RgbImage)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let timestamp = self.timestamps.next()?;

        match self.source.frame_at(timestamp) {
            Ok(frame) => Some(Ok((timestamp, frame))),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
