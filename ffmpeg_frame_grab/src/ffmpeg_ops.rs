use std::{
    ffi::OsStr,
    io::prelude::*,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    time::Duration,
};

#[cfg(target_family = "windows")]
use std::os::windows::process::CommandExt;

use image::RgbImage;
use FfmpegCommandName::*;
use FfmpegError::*;

use crate::{FfmpegError, VideoInfo};

const FFMPEG_TIMEOUT_SECS: usize = 60;

/// An open video file, ready for frame extraction.
///
/// Construction probes the file with ffprobe, so an existing `VideoSource`
/// is a file that was at least recognizable as a video with a nonzero
/// resolution. Each call to [`VideoSource::frame_at`] spawns a short-lived
/// ffmpeg process which is always reaped before the call returns.
#[derive(Debug, Clone)]
pub struct VideoSource {
    src_path: PathBuf,
    info: VideoInfo,
}

impl VideoSource {
    /// Probe the video at `src_path` and prepare it for frame extraction.
    ///
    /// # Errors
    /// * The file cannot be read or is not recognized as a video by ffprobe.
    /// * The probed resolution has a zero dimension (e.g an audio file).
    pub fn open(src_path: impl AsRef<Path>) -> Result<Self, FfmpegError> {
        let src_path = src_path.as_ref().to_path_buf();
        let info = VideoInfo::new(&src_path)?;

        let (x, y) = info.resolution();
        if x == 0 || y == 0 {
            return Err(FfmpegError::InvalidResolution);
        }

        Ok(Self { src_path, info })
    }

    pub fn src_path(&self) -> &Path {
        &self.src_path
    }

    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    /// The total playable length of the video.
    pub fn duration(&self) -> Duration {
        self.info.duration()
    }

    /// The resolution of the video in pixels, corrected for rotation metadata.
    pub fn resolution(&self) -> (u32, u32) {
        self.info.resolution()
    }

    /// Decode the frame nearest to `timestamp` into an RGB raster.
    ///
    /// # Errors
    /// * Ffmpeg failed to seek/decode at the given timestamp.
    /// * Ffmpeg produced fewer bytes than one full frame (seek target at or
    ///   past the end of the stream).
    pub fn frame_at(&self, timestamp: Duration) -> Result<RgbImage, FfmpegError> {
        let (x, y) = self.info.resolution();

        let raw_frame_len = (x as usize)
            .checked_mul(y as usize)
            .and_then(|len| len.checked_mul(3))
            .ok_or(InvalidResolution)?;

        let seek_string = format!("{:.3}", timestamp.as_secs_f64());

        // seeking before -i uses the demuxer's keyframe index, then ffmpeg
        // decodes forward to the requested time. Much faster than decoding
        // the whole stream up to the target.
        #[rustfmt::skip]
        let args = &[
            OsStr::new("-hide_banner"),
            OsStr::new("-loglevel"), OsStr::new("warning"),
            OsStr::new("-nostats"),
            OsStr::new("-threads"), OsStr::new("1"),
            OsStr::new("-ss"),      OsStr::new(&seek_string),
            OsStr::new("-i"),       OsStr::new(&self.src_path),
            OsStr::new("-vframes"), OsStr::new("1"),
            OsStr::new("-pix_fmt"), OsStr::new("rgb24"),
            OsStr::new("-c:v"),     OsStr::new("rawvideo"),
            OsStr::new("-f"),       OsStr::new("image2pipe"),
            OsStr::new("-"),
        ];

        let output = run_ffmpeg_command(Ffmpeg, args, true)?;

        if output.stdout.len() < raw_frame_len {
            return Err(NoFrame { timestamp });
        }

        let mut raw_buf = output.stdout;
        raw_buf.truncate(raw_frame_len);

        RgbImage::from_raw(x, y, raw_buf).ok_or(NoFrame { timestamp })
    }
}

pub(crate) fn get_video_stats<P: AsRef<Path>>(src_path: P) -> Result<String, FfmpegError> {
    let args = &[
        OsStr::new("-v"),
        OsStr::new("quiet"),
        OsStr::new("-show_format"),
        OsStr::new("-show_streams"),
        OsStr::new("-print_format"),
        OsStr::new("json"),
        OsStr::new(src_path.as_ref()),
    ];

    let stdout = run_ffmpeg_command(Ffprobe, args, true)?.stdout;

    String::from_utf8(stdout).map_err(|_| Utf8Conversion)
}

/// Use ffprobe to check whether the file at `src_path` contains a video
/// stream of nonzero length. Subtitle/audio-only/image files return false.
pub fn is_video_file<P: AsRef<Path>>(src_path: P) -> Result<bool, FfmpegError> {
    fn get_ffprobe_output<P: AsRef<Path>>(src_path: P) -> Result<String, FfmpegError> {
        #[rustfmt::skip]
        let args = &[
            OsStr::new("-v"),              OsStr::new("error"),
            OsStr::new("-select_streams"), OsStr::new("v"),
            OsStr::new("-show_entries"),   OsStr::new("stream=codec_type,codec_name,duration"),
            OsStr::new("-of"),             OsStr::new("compact=p=0:nk=1"),
            OsStr::new(src_path.as_ref())
        ];

        run_ffmpeg_command(Ffprobe, args, true).and_then(|output| {
            String::from_utf8(output.stdout)
                .map_err(|_| Utf8Conversion)
                .map(|s| s.trim().to_string())
        })
    }

    let streams_string = get_ffprobe_output(src_path.as_ref())?;

    let mut fields_iter = streams_string.split('|');

    let _codec_name = fields_iter.next().unwrap_or("");
    let codec_type = fields_iter.next().unwrap_or("");

    Ok(codec_type == "video")
}

pub fn ffmpeg_and_ffprobe_are_callable() -> bool {
    //check ffprobe is callable.
    if run_ffmpeg_command(Ffprobe, &[OsStr::new("-version")], true).is_err() {
        return false;
    }

    //now ffmpeg.
    if run_ffmpeg_command(Ffmpeg, &[OsStr::new("-version")], true).is_err() {
        return false;
    }

    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FfmpegCommandName {
    Ffprobe,
    Ffmpeg,
}

impl FfmpegCommandName {
    pub fn as_os_str(&self) -> &'static OsStr {
        match self {
            Self::Ffprobe => OsStr::new("ffprobe"),
            Self::Ffmpeg => OsStr::new("ffmpeg"),
        }
    }
}

fn spawn_ffmpeg_command(
    name: FfmpegCommandName,
    args: &[&OsStr],
    stderr_null: bool,
) -> Result<Child, FfmpegError> {
    let stderr_cfg = if stderr_null {
        Stdio::null()
    } else {
        Stdio::piped()
    };

    let mut command = Command::new(name.as_os_str());
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(stderr_cfg);

    //do not spawn a command window on windows when in a gui application
    #[cfg(target_family = "windows")]
    command.creation_flags(winapi::um::winbase::CREATE_NO_WINDOW);

    command.spawn().map_err(|e| match e.kind() {
        //shell failed to execute the command. Separate out FileNotFound from all other errors
        //as by far the most likely cause is ffmpeg is not installed.
        std::io::ErrorKind::NotFound => FfmpegNotFound,
        _ => Io(format!("{:?}", e.kind())),
    })
}

struct FfmpegOutput {
    _stderr: Vec<u8>,
    stdout: Vec<u8>,
}

type FfmpegCmdResult = Result<FfmpegOutput, FfmpegError>;

fn run_ffmpeg_command(
    name: FfmpegCommandName,
    args: &[&OsStr],
    stderr_null: bool,
) -> FfmpegCmdResult {
    fn truncate_ffmpeg_err_msg(stderr: Vec<u8>) -> FfmpegError {
        match std::str::from_utf8(&stderr) {
            Ok(error_text) => FfmpegInternal(error_text.chars().take(500).collect::<String>()),
            Err(_) => Utf8Conversion,
        }
    }

    let mut child = spawn_ffmpeg_command(name, args, stderr_null)?;

    let mut stdout = child.stdout.take().expect("Failed to obtain stdout");
    let mut stderr = (!stderr_null).then(|| child.stderr.take().expect("Failed to obtain stderr"));

    //Watch for the command exceeding its deadline from a separate thread. The
    //main thread drains stdout/stderr (child processes block when their pipes
    //fill up, so draining must happen before waiting on the exit status).
    let watcher = std::thread::spawn(move || -> std::io::Result<ExitStatus> {
        let mut timeout_counter_millis: usize = 0;
        loop {
            match child.try_wait() {
                Err(e) => return Err(e),
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if timeout_counter_millis >= FFMPEG_TIMEOUT_SECS * 1000 {
                        let _kill_error = child.kill();
                        let _wait_error = child.wait();
                        return Err(std::io::Error::from(std::io::ErrorKind::TimedOut));
                    }
                    std::thread::sleep(Duration::from_millis(1));
                    timeout_counter_millis += 1;
                }
            }
        }
    });

    let mut read_buf = [0u8; 4096];
    let mut stdout_acc = vec![];
    let mut stderr_acc = vec![];

    let mut stdout_done = false;
    let mut stderr_done = stderr_null;

    while !(stdout_done && stderr_done) {
        if !stdout_done {
            match stdout.read(&mut read_buf) {
                Err(_) | Ok(0) => stdout_done = true,
                Ok(amount) => stdout_acc.extend_from_slice(&read_buf[..amount]),
            }
        }

        if !stderr_done {
            match stderr.as_mut().unwrap().read(&mut read_buf) {
                Err(_) | Ok(0) => stderr_done = true,
                Ok(amount) => stderr_acc.extend_from_slice(&read_buf[..amount]),
            }
        }
    }

    let exit_status = watcher.join().expect("thread couldn't join");

    match exit_status {
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Err(FfmpegNotFound),
            _ => Err(Io(format!("{:?}", e.kind()))),
        },
        //The shell successfully executed it, but maybe it returned an error code
        Ok(status) => {
            if status.success() {
                Ok(FfmpegOutput {
                    stdout: stdout_acc,
                    _stderr: stderr_acc,
                })
            } else {
                //sometimes ffmpeg creates very long error messages. Limit them to the first 500 characters
                Err(truncate_ffmpeg_err_msg(stderr_acc))
            }
        }
    }
}
