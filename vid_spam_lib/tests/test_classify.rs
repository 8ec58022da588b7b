use std::time::Duration;

use image::{Rgb, RgbImage};
use itertools::Itertools;
use vid_spam_lib::*;

/// A frame source that serves a fixed sequence of rasters, one per
/// `frame_at` call, regardless of the requested timestamp.
struct ScriptedSource {
    duration: Duration,
    frames: Vec<RgbImage>,
    next_frame: usize,
}

impl ScriptedSource {
    fn new(duration_secs: u64, frames: Vec<RgbImage>) -> Self {
        Self {
            duration: Duration::from_secs(duration_secs),
            frames,
            next_frame: 0,
        }
    }
}

impl FrameSource for ScriptedSource {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn frame_at(&mut self, timestamp: Duration) -> Result<RgbImage, Error> {
        let frame = self.frames.get(self.next_frame).cloned();
        self.next_frame += 1;

        frame.ok_or(Error::Decode {
            timestamp,
            error: ffmpeg_frame_grab::FfmpegError::NoFrame { timestamp },
        })
    }
}

fn flat_frame(colour: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(8, 8, Rgb(colour))
}

const GRAY: [u8; 3] = [128, 128, 128];
const WHITE: [u8; 3] = [255, 255, 255];
const BLUE: [u8; 3] = [0, 0, 255];
const GREEN: [u8; 3] = [0, 255, 0];

#[test]
//duration 100 with 5 samples puts frames at 10/30/50/70/90. All five frames
//identical means 4 near-identical pairs, which exceeds the default
//max_same_img of 2.
fn test_static_video_is_spam() {
    let frames = vec![flat_frame(GRAY); 5];
    let mut source = ScriptedSource::new(100, frames);

    let classification =
        classify_video(&mut source, &BinaryDiffer::default(), &SpamCfg::default()).unwrap();

    assert_eq!(classification.verdict, Verdict::Spam);
    assert_eq!(classification.identical_pairs, 4);
    assert_eq!(classification.pairs_evaluated, 4);

    //each pair report carries the timestamp of its later frame.
    let exp_pair_ends = [30.0, 50.0, 70.0, 90.0];
    assert_eq!(classification.pair_reports.len(), exp_pair_ends.len());
    for (report, exp) in classification.pair_reports.iter().zip(exp_pair_ends) {
        assert!((report.timestamp.as_secs_f64() - exp).abs() < 1e-9);
        assert!(report.near_identical);
        assert_eq!(report.difference_pct, 0.0);
    }
}

#[test]
fn test_alternating_frames_are_not_spam() {
    let frames = [WHITE, BLUE, WHITE, BLUE, WHITE]
        .iter()
        .map(|c| flat_frame(*c))
        .collect_vec();
    let mut source = ScriptedSource::new(50, frames);

    let classification =
        classify_video(&mut source, &BinaryDiffer::default(), &SpamCfg::default()).unwrap();

    assert_eq!(classification.verdict, Verdict::NotSpam);
    assert_eq!(classification.identical_pairs, 0);
    assert!(classification
        .pair_reports
        .iter()
        .all(|r| !r.near_identical));
}

#[test]
//a single sample yields zero pairs, and with no evidence the verdict must
//be NotSpam.
fn test_single_sample_is_never_spam() {
    let mut source = ScriptedSource::new(100, vec![flat_frame(GRAY)]);
    let cfg = SpamCfg {
        sample_count: 1,
        ..SpamCfg::default()
    };

    let classification = classify_video(&mut source, &BinaryDiffer::default(), &cfg).unwrap();

    assert_eq!(classification.verdict, Verdict::NotSpam);
    assert_eq!(classification.identical_pairs, 0);
    assert_eq!(classification.pairs_evaluated, 0);
}

#[test]
//the spam boundary is inclusive: identical_pairs == max_same_img flags the
//video.
fn test_identical_pair_count_boundary_is_inclusive() {
    //GRAY GRAY GRAY BLUE GREEN: exactly two near-identical pairs.
    let at_boundary = [GRAY, GRAY, GRAY, BLUE, GREEN];
    //GRAY GRAY BLUE GREEN WHITE: exactly one.
    let below_boundary = [GRAY, GRAY, BLUE, GREEN, WHITE];

    let classify = |colours: &[[u8; 3]]| {
        let frames = colours.iter().map(|c| flat_frame(*c)).collect_vec();
        let mut source = ScriptedSource::new(100, frames);
        classify_video(&mut source, &BinaryDiffer::default(), &SpamCfg::default()).unwrap()
    };

    let spam = classify(&at_boundary);
    assert_eq!(spam.identical_pairs, 2);
    assert_eq!(spam.verdict, Verdict::Spam);

    let not_spam = classify(&below_boundary);
    assert_eq!(not_spam.identical_pairs, 1);
    assert_eq!(not_spam.verdict, Verdict::NotSpam);
}

#[test]
//a decode failure aborts classification: no verdict, and the error carries
//the failing timestamp (the 3rd of 5 samples across 100s sits at 50s).
fn test_decode_failure_aborts_with_timestamp() {
    let frames = vec![flat_frame(GRAY); 2];
    let mut source = ScriptedSource::new(100, frames);

    let result = classify_video(&mut source, &BinaryDiffer::default(), &SpamCfg::default());

    match result {
        Err(Error::Decode { timestamp, .. }) => {
            assert!((timestamp.as_secs_f64() - 50.0).abs() < 1e-9);
        }
        other => panic!("expected Decode error, got {other:?}"),
    }
}

#[test]
fn test_classification_is_deterministic() {
    let colours = [GRAY, GRAY, BLUE, GRAY, GRAY];

    let run = || {
        let frames = colours.iter().map(|c| flat_frame(*c)).collect_vec();
        let mut source = ScriptedSource::new(60, frames);
        classify_video(&mut source, &PerceptualDiffer::default(), &SpamCfg::default()).unwrap()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_mid_stream_dimension_change_fails() {
    let frames = vec![
        flat_frame(GRAY),
        RgbImage::from_pixel(4, 4, Rgb(GRAY)),
        flat_frame(GRAY),
    ];
    let mut source = ScriptedSource::new(30, frames);
    let cfg = SpamCfg {
        sample_count: 3,
        ..SpamCfg::default()
    };

    let result = classify_video(&mut source, &BinaryDiffer::default(), &cfg);

    assert!(matches!(
        result,
        Err(Error::DimensionMismatch {
            expected: (8, 8),
            actual: (4, 4)
        })
    ));
}

#[test]
fn test_invalid_config_is_rejected_before_sampling() {
    let mut source = ScriptedSource::new(100, vec![]);

    let zero_samples = SpamCfg {
        sample_count: 0,
        ..SpamCfg::default()
    };
    assert!(matches!(
        classify_video(&mut source, &BinaryDiffer::default(), &zero_samples),
        Err(Error::Config(_))
    ));

    let bad_threshold = SpamCfg {
        similarity_threshold: 150.0,
        ..SpamCfg::default()
    };
    assert!(matches!(
        classify_video(&mut source, &BinaryDiffer::default(), &bad_threshold),
        Err(Error::Config(_))
    ));

    //a zero pair threshold would flag every video, even a single-sample run
    //with no pairs.
    let zero_pair_threshold = SpamCfg {
        max_same_img: 0,
        ..SpamCfg::default()
    };
    assert!(matches!(
        classify_video(&mut source, &BinaryDiffer::default(), &zero_pair_threshold),
        Err(Error::Config(_))
    ));

    //no frames were requested by either rejected run.
    assert_eq!(source.next_frame, 0);
}

#[test]
fn test_zero_duration_video_fails() {
    let mut source = ScriptedSource::new(0, vec![flat_frame(GRAY)]);

    let result = classify_video(&mut source, &BinaryDiffer::default(), &SpamCfg::default());

    assert!(matches!(result, Err(Error::EmptyVideo)));
}

#[test]
//the observer sees every sampled frame exactly once, in timestamp order.
fn test_observer_sees_all_sampled_frames() {
    let frames = vec![flat_frame(GRAY); 5];
    let mut source = ScriptedSource::new(100, frames);

    let mut seen = vec![];
    classify_video_with_observer(
        &mut source,
        &BinaryDiffer::default(),
        &SpamCfg::default(),
        |idx, ts, _frame| seen.push((idx, ts)),
    )
    .unwrap();

    assert_eq!(seen.len(), 5);
    for ((idx_a, ts_a), (idx_b, ts_b)) in seen.iter().tuple_windows() {
        assert_eq!(idx_a + 1, *idx_b);
        assert!(ts_a < ts_b);
    }
}
