//! Shared append-only log of links that could not be resolved.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One line per unresolved link, appended under a lock so concurrent
/// resolvers never interleave. The file is opened lazily on the first
/// append, so a run without misses leaves it untouched.
#[derive(Debug)]
pub struct MissLog {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl MissLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `link` as one line and flushes.
    pub fn append(&self, link: &str) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("miss log lock poisoned"))?;
        if guard.is_none() {
            let f = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            *guard = Some(f);
        }
        let Some(file) = guard.as_mut() else {
            return Ok(());
        };
        // One write per line keeps each line atomic in append mode.
        file.write_all(format!("{}\n", link.trim_end()).as_bytes())?;
        file.flush()
    }
}
