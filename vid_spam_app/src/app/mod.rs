mod app_cfg;
mod app_fns;
mod arg_parse;
mod errors;
mod frame_dump;
mod report;

pub(crate) use app_cfg::*;
pub(crate) use errors::*;

pub(crate) use report::{FileOutcome, FileReport};

pub use app_fns::run_app;
