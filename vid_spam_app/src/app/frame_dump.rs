use std::path::Path;
use std::time::Duration;

use image::RgbImage;

/// Write one sampled frame to `dump_dir` as a PNG, named after the source
/// file, the sample index and the sample timestamp.
///
/// This is a diagnostic sink: any failure is logged at warn level and
/// swallowed, so a full disk or an unwritable directory can never change a
/// verdict.
pub(super) fn dump_frame(
    dump_dir: &Path,
    src_path: &Path,
    idx: usize,
    timestamp: Duration,
    frame: &RgbImage,
) {
    let stem = src_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());

    let dest = dump_dir.join(format!("{stem}_{idx:02}_{}ms.png", timestamp.as_millis()));

    if let Err(e) = frame.save(&dest) {
        warn!("failed to write sampled frame {}: {e}", dest.display());
    }
}
