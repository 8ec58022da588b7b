use std::path::{Path, PathBuf};

use clap::{value_parser, ArgAction::*};
use vid_spam_lib::{
    DiffStrategy, SpamCfg, DEFAULT_BINARY_CHANNEL_TOLERANCE, DEFAULT_MAX_SAME_IMG,
    DEFAULT_SAMPLE_COUNT,
};

use crate::app::*;

// file specification
const TARGET_PATH: &str = "File or directory to check";

// sampling/classification configuration
const SAMPLE_COUNT: &str = "Number of frames to sample";
const MAX_SAME_IMG: &str = "Number of identical pairs to report as spam";
const SIMILARITY_THRESHOLD: &str = "Similarity threshold";

// comparison strategy
const STRATEGY: &str = "Comparison strategy";
const CHANNEL_TOLERANCE: &str = "Binary per-channel tolerance";

// output settings
const OUTPUT_FORMAT: &str = "Format";
const KEEP_FRAMES_DIR: &str = "Keep frames directory";

// verbosity
const VERBOSITY_QUIET: &str = "Quiet";
const VERBOSITY_VERBOSE: &str = "Verbose";

const DISPLAY_ORDERING: [&str; 10] = [
    //
    // file specification
    TARGET_PATH,
    //
    // classification
    SAMPLE_COUNT,
    MAX_SAME_IMG,
    SIMILARITY_THRESHOLD,
    //
    // strategy
    STRATEGY,
    CHANNEL_TOLERANCE,
    //
    // outputs
    OUTPUT_FORMAT,
    KEEP_FRAMES_DIR,
    //
    // verbosity
    VERBOSITY_QUIET,
    VERBOSITY_VERBOSE,
];

fn build_app() -> clap::Command {
    let get_ordering = |arg_name: &str| -> usize {
        match DISPLAY_ORDERING.iter().position(|x| *x == arg_name) {
            Some(idx) => idx,
            None => {
                panic!("argument not assigned a display order: {arg_name:?}");
            }
        }
    };

    //args are not added through method chaining because rustfmt struggles with very long expressions.
    let mut clap_app = clap::Command::new("Video spam detector")
        .version(clap::crate_version!())
        .about("Detect spam videos (static, looped, or near-duplicate screen captures) by sampling frames and comparing adjacent pairs");

    clap_app = clap_app.arg(
        clap::Arg::new(TARGET_PATH)
            .required(true)
            .num_args(1)
            .value_parser(value_parser!(PathBuf))
            .help("A video file to classify, or a directory whose immediate files will each be classified independently")
            .display_order(get_ordering(TARGET_PATH)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(SAMPLE_COUNT)
            .short('n')
            .long("samples")
            .num_args(1)
            .value_parser(value_parser!(usize))
            .default_value(DEFAULT_SAMPLE_COUNT.to_string())
            .help("Number of frames to sample, evenly spread across the video's duration")
            .display_order(get_ordering(SAMPLE_COUNT)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(MAX_SAME_IMG)
            .short('s')
            .long("max-same")
            .num_args(1)
            .value_parser(value_parser!(u32))
            .default_value(DEFAULT_MAX_SAME_IMG.to_string())
            .help("Number of near-identical adjacent pairs at which the video is reported as spam")
            .display_order(get_ordering(MAX_SAME_IMG)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(SIMILARITY_THRESHOLD)
            .long("threshold")
            .num_args(1)
            .value_parser(value_parser!(f64))
            .help("A pair whose percentage of differing pixels is at or below this value counts as near-identical. Defaults depend on the strategy: 10.0 for binary, 1.0 for perceptual")
            .display_order(get_ordering(SIMILARITY_THRESHOLD)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(STRATEGY)
            .long("strategy")
            .num_args(1)
            .value_parser(value_parser!(DiffStrategyArg))
            .default_value("binary")
            .help("How pixels are compared. 'binary' requires (near-)exact equality; 'perceptual' measures colour distance and tolerates codec noise and antialiasing")
            .display_order(get_ordering(STRATEGY)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(CHANNEL_TOLERANCE)
            .long("channel-tolerance")
            .num_args(1)
            .value_parser(value_parser!(u8))
            .default_value(DEFAULT_BINARY_CHANNEL_TOLERANCE.to_string())
            .help("Binary strategy only: two pixels still count as equal if every channel differs by at most this many code values. 0 means bit-exact")
            .display_order(get_ordering(CHANNEL_TOLERANCE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(OUTPUT_FORMAT)
            .long("output-format")
            .help("Whether to output as normal text, or JSON.")
            .value_parser(value_parser!(OutputFormat))
            .default_value("normal")
            .num_args(1)
            .display_order(get_ordering(OUTPUT_FORMAT)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(KEEP_FRAMES_DIR)
            .long("keep-frames")
            .value_parser(value_parser!(PathBuf))
            .num_args(1)
            .help("Write every sampled frame to the given directory as a PNG (diagnostic only; write failures never change the verdict)")
            .display_order(get_ordering(KEEP_FRAMES_DIR)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_QUIET)
            .long("quiet")
            .help("Reduced verbosity")
            .conflicts_with(VERBOSITY_VERBOSE)
            .action(SetTrue)
            .display_order(get_ordering(VERBOSITY_QUIET)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_VERBOSE)
            .long("verbose")
            .help("Increased verbosity (logs the difference percentage of every sampled pair)")
            .conflicts_with(VERBOSITY_QUIET)
            .action(SetTrue)
            .display_order(get_ordering(VERBOSITY_VERBOSE)),
    );

    clap_app
}

pub fn parse_args() -> AppCfg {
    //capture the cwd once, to minimize the risk of working with two values if it is changed by the OS at runtime.
    let cwd = std::env::current_dir().expect("failed to extract cwd");

    let args = build_app().get_matches();

    let target_path = absolutify_path(
        &cwd,
        args.get_one::<PathBuf>(TARGET_PATH)
            .expect("This argument is required"),
    );

    if !target_path.exists() {
        print_error_and_quit(eyre::Report::msg(format!(
            "path not found: {}",
            target_path.display()
        )));
    }

    let strategy: DiffStrategy = (*args
        .get_one::<DiffStrategyArg>(STRATEGY)
        .expect("This argument has a default value"))
    .into();

    let spam_cfg = SpamCfg {
        sample_count: *args
            .get_one::<usize>(SAMPLE_COUNT)
            .expect("This argument has a default value"),
        max_same_img: *args
            .get_one::<u32>(MAX_SAME_IMG)
            .expect("This argument has a default value"),
        similarity_threshold: args
            .get_one::<f64>(SIMILARITY_THRESHOLD)
            .copied()
            .unwrap_or_else(|| strategy.default_similarity_threshold()),
    };

    let differ_cfg = DifferCfg {
        strategy,
        channel_tolerance: *args
            .get_one::<u8>(CHANNEL_TOLERANCE)
            .expect("This argument has a default value"),
    };

    let verbosity = if args.get_flag(VERBOSITY_QUIET) {
        ReportVerbosity::Quiet
    } else if args.get_flag(VERBOSITY_VERBOSE) {
        ReportVerbosity::Verbose
    } else {
        ReportVerbosity::Default
    };

    let output_cfg = OutputCfg {
        format: *args
            .get_one::<OutputFormat>(OUTPUT_FORMAT)
            .expect("This argument has a default value"),
        verbosity,
        keep_frames_dir: args
            .get_one::<PathBuf>(KEEP_FRAMES_DIR)
            .map(|dir| absolutify_path(&cwd, dir)),
    };

    AppCfg {
        target_path,
        spam_cfg,
        differ_cfg,
        output_cfg,
    }
}

fn absolutify_path(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
