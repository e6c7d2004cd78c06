//! Disk side of a resolution: output files, the skip check and the miss log.
//!
//! Downloads go to `<name>.part` and are atomically renamed to the final name
//! once the stream is fully written; an unfinished `.part` is removed.

mod miss_log;
mod writer;

pub use miss_log::MissLog;
pub use writer::{DownloadWriter, WriteError};

use std::fs;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `clip.mp4` → `clip.mp4.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Finds a finished file in `dir` named `<stem>.<anything>`.
///
/// This is the completion marker for a base link: any extension counts, so
/// an earlier run's `doc.pdf` skips `doc` entirely. `.part` leftovers do not
/// count. An unreadable directory is treated as empty.
pub fn find_existing(dir: &Path, stem: &str) -> Option<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "skip check: cannot list output dir");
            return None;
        }
    };
    entries.flatten().map(|e| e.path()).find(|path| {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if name.ends_with(TEMP_SUFFIX) || !path.is_file() {
            return false;
        }
        name.strip_prefix(stem)
            .and_then(|rest| rest.strip_prefix('.'))
            .is_some_and(|ext| !ext.is_empty() && !ext.contains('.'))
    })
}
