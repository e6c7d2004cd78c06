//! Diagnostic logging for softprobe.
//!
//! Events go to `~/.local/state/softprobe/softprobe.log`; the CLI falls back
//! to stderr when that file cannot be opened. Stdout stays reserved for the
//! per-link progress lines. Workers log concurrently, so every line carries
//! its thread id.

use anyhow::Result;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Filter used when neither `SOFTPROBE_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "info,softprobe=debug,softprobe_core=debug";
/// Env var with a filter directive that takes precedence over `RUST_LOG`.
pub const LOG_ENV: &str = "SOFTPROBE_LOG";

/// Per-event writer: a clone of the log file handle, or stderr if cloning failed.
enum LogSink {
    File(fs::File),
    Stderr,
}

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::File(f) => f.write(buf),
            LogSink::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::File(f) => f.flush(),
            LogSink::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct SharedLogFile(fs::File);

impl<'a> MakeWriter<'a> for SharedLogFile {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        match self.0.try_clone() {
            Ok(f) => LogSink::File(f),
            Err(_) => LogSink::Stderr,
        }
    }
}

fn filter_from(directive: Option<&str>) -> EnvFilter {
    directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn env_filter() -> EnvFilter {
    let directive = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var(EnvFilter::DEFAULT_ENV))
        .ok();
    filter_from(directive.as_deref())
}

/// `~/.local/state/softprobe/softprobe.log`, creating the directory if needed.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("softprobe")?;
    Ok(xdg_dirs.place_state_file("softprobe.log")?)
}

/// Installs the global subscriber writing to the state log file.
/// Returns Err (and installs nothing) if the file cannot be opened.
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(BoxMakeWriter::new(SharedLogFile(file)))
        .with_thread_ids(true)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing init: {}", e))?;

    tracing::info!("softprobe logging initialized at {}", path.display());
    Ok(())
}

/// Stderr-only subscriber for when `init_logging` fails.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_thread_ids(true)
        .with_ansi(false)
        .try_init();
}
