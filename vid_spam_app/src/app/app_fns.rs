use std::{
    error::Error as StdError,
    io::BufWriter,
    path::{Path, PathBuf},
};

use ffmpeg_frame_grab::{ffmpeg_and_ffprobe_are_callable, is_video_file, FfmpegError, VideoSource};
use itertools::Itertools;
#[cfg(feature = "parallel_loading")]
use rayon::prelude::*;
use vid_spam_lib::*;

use crate::app::frame_dump::dump_frame;
use crate::app::*;

// * read cfg
// * reject invalid configuration before touching the filesystem
// * classify one file, or every immediate file of a directory
// * report a verdict (or failure) per file, never a combined verdict
// * map the outcome to an exit code

const EXIT_NOT_SPAM: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_SPAM: i32 = 2;

pub fn run_app() -> i32 {
    let cfg = arg_parse::parse_args();
    configure_logs(cfg.output_cfg.verbosity);

    match run_app_inner(&cfg) {
        Ok(exit_code) => exit_code,
        Err(fatal_error) => {
            print_fatal_err(fatal_error, cfg.output_cfg.verbosity);
            EXIT_ERROR
        }
    }
}

fn run_app_inner(cfg: &AppCfg) -> eyre::Result<i32> {
    //bad configuration is rejected before any file is opened.
    cfg.spam_cfg.validate()?;

    if !ffmpeg_and_ffprobe_are_callable() {
        return Err(eyre::Report::msg(
            "ffmpeg/ffprobe not found. Make sure ffmpeg and ffprobe are installed and visible on the command line",
        ));
    }

    if let Some(dump_dir) = &cfg.output_cfg.keep_frames_dir {
        if let Err(e) = std::fs::create_dir_all(dump_dir) {
            //diagnostic output only; the individual frame writes will warn too.
            warn!(
                "could not create frame dump directory {}: {e}",
                dump_dir.display()
            );
        }
    }

    let differ = build_differ(&cfg.differ_cfg);

    if cfg.target_path.is_dir() {
        run_directory(cfg, differ.as_ref())
    } else {
        run_single_file(cfg, differ.as_ref())
    }
}

//The strategy is picked once here and injected everywhere else; per-pair
//code never switches on it.
fn build_differ(differ_cfg: &DifferCfg) -> Box<dyn Differ + Send + Sync> {
    match differ_cfg.strategy {
        DiffStrategy::Binary => Box::new(BinaryDiffer::new(differ_cfg.channel_tolerance)),
        DiffStrategy::Perceptual => Box::new(PerceptualDiffer::default()),
    }
}

fn classify_one_file(
    cfg: &AppCfg,
    differ: &(dyn Differ + Send + Sync),
    src_path: &Path,
) -> Result<Classification, vid_spam_lib::Error> {
    let mut source = VideoSource::open(src_path).map_err(|error| vid_spam_lib::Error::Open {
        src_path: src_path.to_path_buf(),
        error,
    })?;

    info!(
        "classifying {} (duration {:.1}s, {} samples)",
        src_path.display(),
        FrameSource::duration(&source).as_secs_f64(),
        cfg.spam_cfg.sample_count
    );

    match &cfg.output_cfg.keep_frames_dir {
        Some(dump_dir) => classify_video_with_observer(
            &mut source,
            differ,
            &cfg.spam_cfg,
            |idx, timestamp, frame| dump_frame(dump_dir, src_path, idx, timestamp, frame),
        ),
        None => classify_video(&mut source, differ, &cfg.spam_cfg),
    }
}

#[allow(clippy::print_stdout)]
fn run_single_file(cfg: &AppCfg, differ: &(dyn Differ + Send + Sync)) -> eyre::Result<i32> {
    let src_path = &cfg.target_path;

    //unlike batch mode, a non-video target here is an error, not a skip.
    let probe_outcome = is_video_file(src_path).map_err(|error| AppError::Classify {
        src_path: src_path.clone(),
        error: vid_spam_lib::Error::Open {
            src_path: src_path.clone(),
            error,
        },
    })?;

    if !probe_outcome {
        return Err(AppError::Classify {
            src_path: src_path.clone(),
            error: vid_spam_lib::Error::NotVideo,
        }
        .into());
    }

    let classification =
        classify_one_file(cfg, differ, src_path).map_err(|error| AppError::Classify {
            src_path: src_path.clone(),
            error,
        })?;

    match cfg.output_cfg.format {
        OutputFormat::Normal => {
            if classification.is_spam() {
                println!(
                    "This is SPAM! ({}>={})",
                    classification.identical_pairs, cfg.spam_cfg.max_same_img
                );
            } else {
                println!(
                    "This is not spam... ({}<{})",
                    classification.identical_pairs, cfg.spam_cfg.max_same_img
                );
            }
        }
        OutputFormat::Json => {
            let stdout = BufWriter::new(std::io::stdout());
            serde_json::to_writer_pretty(stdout, &classification)?;
            println!();
        }
    }

    let exit_code = if classification.is_spam() {
        EXIT_SPAM
    } else {
        EXIT_NOT_SPAM
    };

    Ok(exit_code)
}

fn run_directory(cfg: &AppCfg, differ: &(dyn Differ + Send + Sync)) -> eyre::Result<i32> {
    let dir = &cfg.target_path;

    //immediate regular files only; batch mode does not recurse.
    //sorted so the report is deterministic even when classification runs
    //in parallel.
    let file_paths = std::fs::read_dir(dir)
        .map_err(|error| AppError::ReadDir {
            dir: dir.clone(),
            error,
        })?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .sorted()
        .collect_vec();

    if file_paths.is_empty() {
        warn!("no files found in {}", dir.display());
    }

    #[cfg(feature = "parallel_loading")]
    let it = file_paths.par_iter();

    #[cfg(not(feature = "parallel_loading"))]
    let it = file_paths.iter();

    let reports = it
        .map(|src_path| process_batch_entry(cfg, differ, src_path))
        .collect::<Vec<FileReport>>();

    print_batch_reports(cfg, &reports)?;

    Ok(batch_exit_code(&reports))
}

//failures outrank spam: a script must not mistake "could not check some
//files" for a clean result.
fn batch_exit_code(reports: &[FileReport]) -> i32 {
    if reports.iter().any(FileReport::is_failed) {
        EXIT_ERROR
    } else if reports.iter().any(FileReport::is_spam) {
        EXIT_SPAM
    } else {
        EXIT_NOT_SPAM
    }
}

fn process_batch_entry(
    cfg: &AppCfg,
    differ: &(dyn Differ + Send + Sync),
    src_path: &PathBuf,
) -> FileReport {
    batch_entry_report(
        src_path,
        || is_video_file(src_path),
        || classify_one_file(cfg, differ, src_path),
    )
}

//One file's failure must never abort its siblings, so every outcome is
//captured in the report instead of propagated. Probing and classification
//are injected so this policy can be tested without ffmpeg.
fn batch_entry_report(
    src_path: &Path,
    probe: impl FnOnce() -> Result<bool, FfmpegError>,
    classify: impl FnOnce() -> Result<Classification, vid_spam_lib::Error>,
) -> FileReport {
    let outcome = match probe() {
        Ok(false) => FileOutcome::Skipped {
            reason: "not a video".to_string(),
        },
        Err(error) => FileOutcome::Failed {
            error: vid_spam_lib::Error::Open {
                src_path: src_path.to_path_buf(),
                error,
            },
        },
        Ok(true) => match classify() {
            Ok(classification) => FileOutcome::Classified(classification),
            Err(error) => {
                error!("{}: {error}", src_path.display());
                FileOutcome::Failed { error }
            }
        },
    };

    FileReport {
        path: src_path.to_path_buf(),
        outcome,
    }
}

#[allow(clippy::print_stdout)]
fn print_batch_reports(cfg: &AppCfg, reports: &[FileReport]) -> eyre::Result<()> {
    match cfg.output_cfg.format {
        OutputFormat::Normal => {
            for report in reports {
                match &report.outcome {
                    FileOutcome::Classified(c) if c.is_spam() => {
                        println!(
                            "{}: SPAM ({}>={})",
                            report.path.display(),
                            c.identical_pairs,
                            cfg.spam_cfg.max_same_img
                        );
                    }
                    FileOutcome::Classified(c) => {
                        println!(
                            "{}: not spam ({}<{})",
                            report.path.display(),
                            c.identical_pairs,
                            cfg.spam_cfg.max_same_img
                        );
                    }
                    FileOutcome::Skipped { reason } => {
                        println!("{}: skipped ({reason})", report.path.display());
                    }
                    FileOutcome::Failed { error } => {
                        println!("{}: ERROR: {error}", report.path.display());
                    }
                }
            }
        }
        OutputFormat::Json => {
            let stdout = BufWriter::new(std::io::stdout());
            serde_json::to_writer_pretty(stdout, reports)?;
            println!();
        }
    }

    Ok(())
}

fn print_fatal_err(fatal_err: eyre::Report, verbosity: ReportVerbosity) {
    error!(target: "app-errorlog", "{}", fatal_err);

    if verbosity == ReportVerbosity::Verbose {
        let mut source: Option<&(dyn StdError + 'static)> = fatal_err.source();
        while let Some(e) = source {
            error!(target: "app-errorlog", "    caused by: {}", e);
            source = e.source();
        }
    }
}

pub fn configure_logs(verbosity: ReportVerbosity) {
    use simplelog::*;

    let mut cfg = simplelog::ConfigBuilder::new();

    let min_loglevel = match verbosity {
        ReportVerbosity::Quiet => LevelFilter::Warn,
        ReportVerbosity::Default => LevelFilter::Info,
        ReportVerbosity::Verbose => LevelFilter::Trace,
    };

    TermLogger::init(
        min_loglevel,
        cfg.build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .expect("TermLogger failed to initialize");
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use vid_spam_lib::{Classification, Verdict};

    use super::*;

    fn classified(name: &str, verdict: Verdict) -> FileReport {
        FileReport {
            path: PathBuf::from(name),
            outcome: FileOutcome::Classified(Classification {
                verdict,
                identical_pairs: u32::from(verdict == Verdict::Spam) * 4,
                pairs_evaluated: 4,
                pair_reports: vec![],
            }),
        }
    }

    fn failed(name: &str) -> FileReport {
        FileReport {
            path: PathBuf::from(name),
            outcome: FileOutcome::Failed {
                error: vid_spam_lib::Error::EmptyVideo,
            },
        }
    }

    fn skipped(name: &str) -> FileReport {
        FileReport {
            path: PathBuf::from(name),
            outcome: FileOutcome::Skipped {
                reason: "not a video".to_string(),
            },
        }
    }

    #[test]
    fn test_batch_exit_code_clean_run() {
        let reports = [
            classified("a.mp4", Verdict::NotSpam),
            skipped("notes.txt"),
            classified("b.mp4", Verdict::NotSpam),
        ];
        assert_eq!(batch_exit_code(&reports), EXIT_NOT_SPAM);
    }

    #[test]
    fn test_batch_exit_code_flags_spam() {
        let reports = [
            classified("a.mp4", Verdict::NotSpam),
            classified("b.mp4", Verdict::Spam),
        ];
        assert_eq!(batch_exit_code(&reports), EXIT_SPAM);
    }

    //one broken file among verdicts: the verdicts stand per file, but the
    //run as a whole must report the failure.
    #[test]
    fn test_batch_exit_code_failure_outranks_spam() {
        let reports = [
            classified("a.mp4", Verdict::Spam),
            failed("corrupt.mp4"),
            classified("b.mp4", Verdict::NotSpam),
        ];
        assert_eq!(batch_exit_code(&reports), EXIT_ERROR);
    }

    #[test]
    fn test_batch_exit_code_empty_directory_is_clean() {
        assert_eq!(batch_exit_code(&[]), EXIT_NOT_SPAM);
    }

    //one unopenable file among three: the other two still get verdicts and
    //only the broken one is reported as failed.
    #[test]
    fn test_batch_entry_failure_does_not_abort_siblings() {
        let verdicts = [
            ("a.mp4", Ok(Verdict::NotSpam)),
            ("corrupt.mp4", Err(())),
            ("c.mp4", Ok(Verdict::Spam)),
        ];

        let reports = verdicts
            .iter()
            .map(|(name, outcome)| {
                batch_entry_report(
                    Path::new(name),
                    || match outcome {
                        Ok(_) => Ok(true),
                        Err(()) => Err(FfmpegError::FfmpegInternal("moov atom not found".to_string())),
                    },
                    || match outcome {
                        Ok(verdict) => Ok(Classification {
                            verdict: *verdict,
                            identical_pairs: u32::from(*verdict == Verdict::Spam) * 4,
                            pairs_evaluated: 4,
                            pair_reports: vec![],
                        }),
                        Err(()) => unreachable!("probe failed, classify must not run"),
                    },
                )
            })
            .collect::<Vec<_>>();

        assert_eq!(reports.len(), 3);
        assert!(
            matches!(&reports[0].outcome, FileOutcome::Classified(c) if c.verdict == Verdict::NotSpam)
        );
        assert!(matches!(
            &reports[1].outcome,
            FileOutcome::Failed {
                error: vid_spam_lib::Error::Open { .. }
            }
        ));
        assert!(
            matches!(&reports[2].outcome, FileOutcome::Classified(c) if c.verdict == Verdict::Spam)
        );

        assert_eq!(batch_exit_code(&reports), EXIT_ERROR);
    }

    //a decode failure partway through a file is caught into the report the
    //same way an unopenable file is.
    #[test]
    fn test_batch_entry_captures_classify_failure() {
        let report = batch_entry_report(
            Path::new("truncated.mp4"),
            || Ok(true),
            || {
                Err(vid_spam_lib::Error::Decode {
                    timestamp: std::time::Duration::from_secs(50),
                    error: FfmpegError::NoFrame {
                        timestamp: std::time::Duration::from_secs(50),
                    },
                })
            },
        );

        assert!(matches!(
            report.outcome,
            FileOutcome::Failed {
                error: vid_spam_lib::Error::Decode { .. }
            }
        ));
    }
}
