use std::time::Duration;

use image::RgbImage;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::definitions::{
    DEFAULT_BINARY_SIMILARITY_THRESHOLD, DEFAULT_MAX_SAME_IMG, DEFAULT_SAMPLE_COUNT,
};
use crate::{ClassifyResult, Differ, Error, FrameSampler, FrameSource};

/// Configuration for one classification run. An immutable value passed into
/// the pipeline, so concurrent per-file runs share no mutable state.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct SpamCfg {
    /// Number of frames to sample across the video's duration. Must be at
    /// least 1. With 1 sample no pairs exist and the verdict is trivially
    /// [`Verdict::NotSpam`].
    pub sample_count: usize,

    /// Number of near-identical adjacent pairs at which the video is
    /// reported as spam (inclusive). Must be at least 1: a threshold of 0
    /// would flag every video, including single-sample runs with no pairs
    /// at all.
    pub max_same_img: u32,

    /// A pair whose difference percentage is at or below this value counts
    /// as near-identical. Percent, in [0, 100]. Sensible defaults differ per
    /// strategy; see [`crate::DiffStrategy::default_similarity_threshold`].
    pub similarity_threshold: f64,
}

impl Default for SpamCfg {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            max_same_img: DEFAULT_MAX_SAME_IMG,
            similarity_threshold: DEFAULT_BINARY_SIMILARITY_THRESHOLD,
        }
    }
}

impl SpamCfg {
    /// Reject invalid configuration before any file is opened.
    pub fn validate(&self) -> ClassifyResult<()> {
        if self.sample_count == 0 {
            return Err(Error::Config("sample count must be at least 1".to_string()));
        }

        if self.max_same_img == 0 {
            return Err(Error::Config(
                "identical pair threshold must be at least 1".to_string(),
            ));
        }

        if !(0.0..=100.0).contains(&self.similarity_threshold) {
            return Err(Error::Config(format!(
                "similarity threshold must be a percentage in [0, 100], got {}",
                self.similarity_threshold
            )));
        }

        Ok(())
    }
}

/// The classification of one video. Produced exactly once per video, after
/// all sampled pairs have been evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The video is a static/duplicate/low-information capture.
    Spam,
    /// Not enough near-identical adjacent pairs to flag the video.
    NotSpam,
}

/// Per-pair diagnostic detail, reported alongside the verdict so callers can
/// log why a video was (or was not) flagged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairReport {
    /// Timestamp of the later frame of the pair.
    pub timestamp: Duration,
    pub difference_pct: f64,
    pub near_identical: bool,
}

/// The full outcome of classifying one video: the verdict plus the counts
/// that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub verdict: Verdict,
    /// How many adjacent pairs compared at or below the similarity threshold.
    pub identical_pairs: u32,
    /// Always `sample_count - 1` on a completed run.
    pub pairs_evaluated: u32,
    pub pair_reports: Vec<PairReport>,
}

impl Classification {
    pub fn is_spam(&self) -> bool {
        self.verdict == Verdict::Spam
    }
}

/// Accumulates pair comparisons into a verdict.
///
/// The lifecycle is linear: construct, feed each adjacent pair in timestamp
/// order through [`Classifier::observe_pair`], then consume with
/// [`Classifier::finish`] to render the verdict. A comparison error aborts
/// the run (the classifier is dropped with it); there is no retry, since
/// frame decoding is deterministic.
pub struct Classifier<'a, D: Differ + ?Sized> {
    differ: &'a D,
    cfg: &'a SpamCfg,
    identical_pairs: u32,
    pair_reports: Vec<PairReport>,
}

impl<'a, D: Differ + ?Sized> Classifier<'a, D> {
    pub fn new(differ: &'a D, cfg: &'a SpamCfg) -> Self {
        Self {
            differ,
            cfg,
            identical_pairs: 0,
            pair_reports: Vec::new(),
        }
    }

    /// Compare one adjacent pair and accumulate the result. `timestamp` is
    /// the sample time of `cur`, carried through for diagnostics.
    ///
    /// # Errors
    /// The underlying strategy failed (mismatched frame dimensions).
    pub fn observe_pair(
        &mut self,
        prev: &RgbImage,
        cur: &RgbImage,
        timestamp: Duration,
    ) -> ClassifyResult<PairReport> {
        let diff = self.differ.compare(prev, cur)?;

        let difference_pct = diff.difference_percentage();
        let near_identical = difference_pct <= self.cfg.similarity_threshold;

        if near_identical {
            self.identical_pairs += 1;
        }

        let report = PairReport {
            timestamp,
            difference_pct,
            near_identical,
        };
        self.pair_reports.push(report);

        Ok(report)
    }

    /// Render the verdict. Spam iff the number of near-identical pairs
    /// reached `max_same_img` (boundary inclusive on the spam side).
    pub fn finish(self) -> Classification {
        let verdict = if self.identical_pairs >= self.cfg.max_same_img {
            Verdict::Spam
        } else {
            Verdict::NotSpam
        };

        Classification {
            verdict,
            identical_pairs: self.identical_pairs,
            pairs_evaluated: self.pair_reports.len() as u32,
            pair_reports: self.pair_reports,
        }
    }
}

/// Classify one video: sample `cfg.sample_count` frames, compare each
/// adjacent pair with `differ`, and aggregate into a [`Classification`].
///
/// Frames are processed strictly sequentially with a sliding window of two,
/// so at most the current and previous frame are resident at once.
///
/// # Errors
/// * Invalid configuration (rejected before any decoding).
/// * The source has zero duration.
/// * A frame failed to decode (the failing timestamp is carried in the
///   error; remaining samples are abandoned and no verdict is produced).
/// * Two frames differed in raster size.
pub fn classify_video<S, D>(
    source: &mut S,
    differ: &D,
    cfg: &SpamCfg,
) -> ClassifyResult<Classification>
where
    S: FrameSource,
    D: Differ + ?Sized,
{
    classify_video_with_observer(source, differ, cfg, |_idx, _ts, _frame| {})
}

/// As [`classify_video`], additionally invoking `observer` with each sampled
/// frame (index, timestamp, raster) as it is retrieved. Used for diagnostic
/// frame dumping; the observer cannot alter the verdict.
pub fn classify_video_with_observer<S, D, F>(
    source: &mut S,
    differ: &D,
    cfg: &SpamCfg,
    mut observer: F,
) -> ClassifyResult<Classification>
where
    S: FrameSource,
    D: Differ + ?Sized,
    F: FnMut(usize, Duration, &RgbImage),
{
    cfg.validate()?;

    let sampler = FrameSampler::new(source, cfg.sample_count)?;
    let mut classifier = Classifier::new(differ, cfg);

    //sliding window of size 2: only the previous frame is retained.
    let mut prev_frame: Option<RgbImage> = None;

    for (idx, item) in sampler.enumerate() {
        let (timestamp, frame) = item?;

        observer(idx, timestamp, &frame);

        if let Some(prev) = &prev_frame {
            let report = classifier.observe_pair(prev, &frame, timestamp)?;
            debug!(
                "pair ending at {:.3}s: difference {:.3}% ({})",
                timestamp.as_secs_f64(),
                report.difference_pct,
                if report.near_identical {
                    "near-identical"
                } else {
                    "distinct"
                }
            );
        }

        prev_frame = Some(frame);
    }

    Ok(classifier.finish())
}
