//! Second phase of a genuine match: write the probed chunk and the rest of
//! the same stream to the output file.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::storage::{DownloadWriter, WriteError};

const COPY_BUF: usize = 64 * 1024;

pub(crate) enum DownloadError {
    /// Reading the response failed; the candidate counts as a transport error.
    Stream(io::Error),
    /// Local output failed; terminal for the link.
    Write(WriteError),
}

impl From<WriteError> for DownloadError {
    fn from(e: WriteError) -> Self {
        DownloadError::Write(e)
    }
}

/// Streams `first_chunk` then `rest` into `final_path` via a `.part` file.
pub(crate) fn save_stream(
    final_path: &Path,
    first_chunk: &[u8],
    rest: &mut dyn Read,
) -> Result<(PathBuf, u64), DownloadError> {
    let mut writer = DownloadWriter::create(final_path)?;
    writer.write_chunk(first_chunk)?;
    let mut buf = vec![0u8; COPY_BUF];
    loop {
        let n = match rest.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(DownloadError::Stream(e)),
        };
        writer.write_chunk(&buf[..n])?;
    }
    Ok(writer.finalize()?)
}
