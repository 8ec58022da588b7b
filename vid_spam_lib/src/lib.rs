#![allow(clippy::let_and_return)]
#![allow(clippy::len_without_is_empty)]
#![warn(clippy::cast_lossless)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::todo)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::unimplemented)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::panic)]
#![allow(clippy::doc_markdown)]

//! # Overview
//! `vid_spam_lib` classifies a video file as spam (a static, looped, or
//! near-duplicate screen capture) versus genuine content.
//!
//! It samples a small number of frames evenly spread across the video's
//! duration and measures the visual similarity of each temporally adjacent
//! pair. A static capture produces many near-identical pairs; genuine footage
//! produces very few. If enough adjacent pairs are near-identical, the video
//! is flagged.
//!
//! # High Level API
//! Open a video, pick a comparison strategy, and classify:
//! ```rust,no_run
//! use vid_spam_lib::{classify_video, BinaryDiffer, SpamCfg, Verdict};
//!
//! let mut source = ffmpeg_frame_grab::VideoSource::open("capture.mp4").unwrap();
//! let differ = BinaryDiffer::default();
//! let cfg = SpamCfg::default();
//!
//! let classification = classify_video(&mut source, &differ, &cfg).unwrap();
//! match classification.verdict {
//!     Verdict::Spam => println!("spam ({} identical pairs)", classification.identical_pairs),
//!     Verdict::NotSpam => println!("looks genuine"),
//! }
//! ```
//!
//! # Comparison strategies
//! Two interchangeable [`Differ`] strategies are provided, selected once per
//! run:
//! * [`BinaryDiffer`] — per-pixel exact equality with a small configurable
//!   per-channel slack (lossy codecs mean bit-exact equality almost never
//!   happens between two independently decoded frames).
//! * [`PerceptualDiffer`] — gamma-corrected conversion to a luma/chroma
//!   opponent colour space and a weighted colour-distance threshold, with an
//!   optional smoothing pass that ignores isolated single-pixel differences
//!   caused by sub-pixel rendering.
//!
//! Both reduce a frame pair to the same [`DiffResult`] shape, so the
//! classifier is strategy-agnostic.
//!
//! # Prerequisites
//! Frame extraction is performed by the companion crate `ffmpeg_frame_grab`,
//! which calls Ffmpeg from the command line. You must make Ffmpeg and Ffprobe
//! available on the command line, for example:
//!
//! * Debian-based systems: ```# apt-get install ffmpeg```
//! * Yum-based systems: ```# yum install ffmpeg```
//! * Windows: install ffmpeg and add its directory to the PATH environment
//!   variable
//!
//! Any type implementing [`FrameSource`] can stand in for a real video, which
//! is how this crate's own tests run without ffmpeg.

mod classify;
mod definitions;
mod differ;
mod errors;
mod sampling;
mod source;

pub use classify::{
    classify_video, classify_video_with_observer, Classification, Classifier, PairReport, SpamCfg,
    Verdict,
};
pub use differ::{binary::BinaryDiffer, perceptual::PerceptualDiffer, DiffResult, Differ};
pub use errors::Error;
pub use sampling::{sample_timestamps, FrameSampler};
pub use source::FrameSource;

pub use definitions::{
    DiffStrategy, DEFAULT_BINARY_CHANNEL_TOLERANCE, DEFAULT_BINARY_SIMILARITY_THRESHOLD,
    DEFAULT_MAX_SAME_IMG, DEFAULT_PERCEPTUAL_DISTANCE_THRESHOLD,
    DEFAULT_PERCEPTUAL_SIMILARITY_THRESHOLD, DEFAULT_SAMPLE_COUNT,
};

type ClassifyResult<T> = Result<T, crate::Error>;
