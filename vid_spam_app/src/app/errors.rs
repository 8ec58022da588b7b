use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /////////////////////////////////
    //per-file classification problems, with the file identity attached
    #[error("Failed to classify {}: {error}", src_path.display())]
    Classify {
        src_path: PathBuf,
        error: vid_spam_lib::Error,
    },

    /////////////////////////////////
    //batch mode problems
    #[error("Failed to read directory {}: {error}", dir.display())]
    ReadDir {
        dir: PathBuf,
        error: std::io::Error,
    },
}

pub fn print_error_and_quit(e: eyre::Report) -> ! {
    #[allow(clippy::print_stderr)]
    let () = eprintln!("{:?}", e);
    std::process::exit(1);
}
