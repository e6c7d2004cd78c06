//! Sequential writer for one downloaded file.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::temp_path;

/// Local output failure. Terminal for the link being resolved.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to rename {} to {}: {source}", from.display(), to.display())]
    Finalize {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Writes a download to `<final>.part`, then renames it into place.
/// Dropping the writer without `finalize` deletes the temp file.
pub struct DownloadWriter {
    file: Option<File>,
    temp_path: PathBuf,
    final_path: PathBuf,
    written: u64,
}

impl DownloadWriter {
    /// Create (or truncate) the temp file for `final_path`.
    pub fn create(final_path: &Path) -> Result<Self, WriteError> {
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|source| WriteError::Create {
                path: temp_path.clone(),
                source,
            })?;
        Ok(Self {
            file: Some(file),
            temp_path,
            final_path: final_path.to_path_buf(),
            written: 0,
        })
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> Result<(), WriteError> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        file.write_all(data).map_err(|source| WriteError::Write {
            path: self.temp_path.clone(),
            source,
        })?;
        self.written += data.len() as u64;
        Ok(())
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Sync and atomically rename the temp file to the final path.
    /// Returns the final path and the number of bytes written.
    pub fn finalize(mut self) -> Result<(PathBuf, u64), WriteError> {
        if let Some(file) = self.file.take() {
            file.sync_all().map_err(|source| WriteError::Write {
                path: self.temp_path.clone(),
                source,
            })?;
        }
        std::fs::rename(&self.temp_path, &self.final_path).map_err(|source| {
            WriteError::Finalize {
                from: self.temp_path.clone(),
                to: self.final_path.clone(),
                source,
            }
        })?;
        // Renamed; nothing left for Drop to clean up.
        self.temp_path = PathBuf::new();
        Ok((self.final_path.clone(), self.written))
    }
}

impl Drop for DownloadWriter {
    fn drop(&mut self) {
        drop(self.file.take());
        if self.temp_path.as_os_str().is_empty() {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.temp_path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.temp_path.display(), error = %e, "could not remove partial download");
            }
        }
    }
}
