use std::path::PathBuf;

use serde::Serialize;
use vid_spam_lib::Classification;

/// The result of processing one file in a batch: exactly one of a
/// classification, a skip, or a failure. There is never a combined verdict
/// across files.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileOutcome {
    Classified(Classification),

    /// The file is not a video (by ffprobe's judgement); batch mode leaves
    /// it out of the verdict tally entirely.
    Skipped { reason: String },

    /// A hard failure: the file could not be opened or a frame could not be
    /// decoded. Reported per file; never aborts the rest of the batch.
    Failed { error: vid_spam_lib::Error },
}

impl FileReport {
    pub fn is_spam(&self) -> bool {
        matches!(&self.outcome, FileOutcome::Classified(c) if c.is_spam())
    }

    pub fn is_failed(&self) -> bool {
        matches!(&self.outcome, FileOutcome::Failed { .. })
    }
}
