use std::path::PathBuf;

use vid_spam_lib::{DiffStrategy, SpamCfg};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportVerbosity {
    Quiet,
    Default,
    Verbose,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputFormat {
    Normal,
    Json,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(super) enum DiffStrategyArg {
    Binary,
    Perceptual,
}

impl From<DiffStrategyArg> for DiffStrategy {
    fn from(arg: DiffStrategyArg) -> Self {
        match arg {
            DiffStrategyArg::Binary => DiffStrategy::Binary,
            DiffStrategyArg::Perceptual => DiffStrategy::Perceptual,
        }
    }
}

// How frames are compared. The strategy is fixed for the whole run; the
// tolerance fields only apply to their respective strategy.
#[derive(Debug, Clone, Copy)]
pub struct DifferCfg {
    pub strategy: DiffStrategy,
    pub channel_tolerance: u8,
}

#[derive(Debug, Clone)]
pub struct OutputCfg {
    pub format: OutputFormat,
    pub verbosity: ReportVerbosity,

    /// When set, every sampled frame is also written to this directory as a
    /// PNG. Failures here are logged but never change the verdict.
    pub keep_frames_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppCfg {
    /// One video file, or a directory whose immediate regular files are each
    /// classified independently.
    pub target_path: PathBuf,

    pub spam_cfg: SpamCfg,
    pub differ_cfg: DifferCfg,
    pub output_cfg: OutputCfg,
}
