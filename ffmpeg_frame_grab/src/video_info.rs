use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::FfmpegError;

#[derive(Debug, Deserialize, Serialize, Clone, Error)]
pub enum VideoInfoError {
    #[error("Error parsing stats: {0}")]
    JsonError(String),
    #[error("Error parsing stats: {0}")]
    ParseIntError(String),
    #[error("Error parsing stats: {0}")]
    ParseFloatError(String),
    #[error("Unexpected rotation in stats: {0}")]
    BadRotation(String),
}

impl From<serde_json::Error> for VideoInfoError {
    fn from(e: serde_json::Error) -> Self {
        //limit maximum number of characters
        let error_string = format!("{e}").chars().take(500).collect::<String>();
        VideoInfoError::JsonError(error_string)
    }
}

impl From<std::num::ParseIntError> for VideoInfoError {
    fn from(e: std::num::ParseIntError) -> Self {
        VideoInfoError::ParseIntError(format!("{e}"))
    }
}

impl From<std::num::ParseFloatError> for VideoInfoError {
    fn from(e: std::num::ParseFloatError) -> Self {
        VideoInfoError::ParseFloatError(format!("{e}"))
    }
}

// There is a slight gotcha in ffmpeg where if the video metadata declares a
// rotation, the raw (x, y) resolution in that metadata refers to the
// "unrotated" resolution. we must therefore swap the x and y values if the
// rotation is 90 or 270
#[derive(PartialEq, Eq, Clone, Debug, Copy, Serialize, Deserialize, Default)]
enum Rotation {
    #[default]
    Upright,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Quarter | Rotation::ThreeQuarter)
    }
}

/// Some of the video metadata that can be obtained by using ffprobe.
#[derive(PartialEq, Eq, Clone, Debug, Serialize, Deserialize, Default)]
pub struct VideoInfo {
    duration: std::time::Duration,
    file_size: u64,
    resolution: (u32, u32),
}

impl VideoInfo {
    /// Use ffprobe to get the duration and resolution of a video. If the video contains multiple streams then only information
    /// about the first stream will be returned.
    ///
    /// # errors
    /// * The file cannot be read or is not recognized as a video by ffprobe
    /// * The output from ffprobe could not be parsed as JSON
    /// * The output from ffprobe did not contain all expected fields.
    pub fn new<P>(src_path: P) -> Result<Self, FfmpegError>
    where
        P: AsRef<Path>,
    {
        let stats_string = crate::get_video_stats(&src_path)?;

        let stats_parsed: Value =
            serde_json::from_str(&stats_string).map_err(VideoInfoError::from)?;

        let duration = if let Value::String(d) = &stats_parsed["format"]["duration"] {
            std::time::Duration::from_secs_f64(d.parse().map_err(VideoInfoError::from)?)
        } else {
            std::time::Duration::ZERO
        };

        let file_size = if let Value::String(s) = &stats_parsed["format"]["size"] {
            s.parse().map_err(VideoInfoError::from)?
        } else {
            0
        };

        let rotation = Self::rotation(&stats_parsed)?;

        let resolution = {
            let raw_width = Self::first_vid_u32(&stats_parsed, "width").unwrap_or(0);
            let raw_height = Self::first_vid_u32(&stats_parsed, "height").unwrap_or(0);

            // Ffmpeg autorotates each decoded frame according to the metadata,
            // so report the post-rotation resolution.
            if rotation.swaps_axes() {
                (raw_height, raw_width)
            } else {
                (raw_width, raw_height)
            }
        };

        Ok(VideoInfo {
            duration,
            file_size,
            resolution,
        })
    }

    /// The duration of the video.
    pub fn duration(&self) -> std::time::Duration {
        self.duration
    }

    /// The size of the video in bytes
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// The resolution of the video in pixels.
    /// Note the returned value is correct for the orientation that the video is intended
    /// to be viewed. (Ffprobe returns a surprising value by default if the video is stored rotated)
    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    fn rotation(stats_parsed: &Value) -> Result<Rotation, VideoInfoError> {
        let raw = Self::first_video(stats_parsed).and_then(|video_stream| {
            video_stream
                .get("side_data_list")
                .and_then(|sdl| sdl.get(0).and_then(|sd| sd.get("rotation").cloned()))
        });

        //if the rotation is found, it may either be a JSON String or JSON number, so unify
        //them here.
        let degrees = match raw {
            None => return Ok(Rotation::Upright),
            Some(Value::Number(val)) => val.as_i64(),
            Some(Value::String(val)) => val.parse::<i64>().ok(),
            Some(other) => return Err(VideoInfoError::BadRotation(format!("{other}"))),
        };

        match degrees {
            Some(0) => Ok(Rotation::Upright),
            Some(90) | Some(-270) => Ok(Rotation::Quarter),
            Some(180) | Some(-180) => Ok(Rotation::Half),
            Some(-90) | Some(270) => Ok(Rotation::ThreeQuarter),
            other => Err(VideoInfoError::BadRotation(format!("{other:?}"))),
        }
    }

    fn first_video(stats_parsed: &Value) -> Option<&Value> {
        if let Value::Array(streams) = &stats_parsed["streams"] {
            streams.iter().find(|s| match &s["codec_type"] {
                Value::String(codec_type) => codec_type == "video",
                _ => false,
            })
        } else {
            None
        }
    }

    fn first_vid_u32(stats_parsed: &Value, field_name: &str) -> Option<u32> {
        let video_stream = Self::first_video(stats_parsed)?;

        if let Value::Number(v) = &video_stream[field_name] {
            Some(v.as_u64()? as u32)
        } else {
            None
        }
    }
}
