//! A small wrapper around the command line interface to ffmpeg and ffprobe.
//!
//! Provides [`VideoInfo`] (duration/resolution/file size obtained with ffprobe)
//! and [`VideoSource`], which can decode the single frame nearest to any
//! timestamp within a video into an [`image::RgbImage`].
//!
//! Ffmpeg and ffprobe must be installed and visible on the command line.
//! This crate deliberately shells out rather than linking: no well-maintained
//! leak-free bindings exist, and static linking can impose additional
//! transitive licensing requirements on downstream users.

mod ffmpeg_error_kind;
mod ffmpeg_ops;
mod video_info;

pub use ffmpeg_error_kind::FfmpegError;
pub use ffmpeg_ops::{ffmpeg_and_ffprobe_are_callable, is_video_file, VideoSource};
pub use video_info::{VideoInfo, VideoInfoError};

pub(crate) use ffmpeg_ops::get_video_stats;
