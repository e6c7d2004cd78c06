//! CLI command handlers. Each command is in its own file.

mod check;
mod extensions;
mod resolve;
mod run;

pub use check::run_check;
pub use extensions::run_extensions;
pub use resolve::run_resolve;
pub use run::run_pages;

use anyhow::{Context, Result};
use softprobe_core::config::SoftprobeConfig;
use softprobe_core::resolver::{Resolution, ResolutionOutcome, Resolver};
use softprobe_core::storage::MissLog;
use std::path::Path;
use std::sync::Arc;

/// Validates `cfg` and builds the shared resolver: table, marker and miss log
/// are loaded once here.
fn build_resolver(cfg: &SoftprobeConfig, output_dir: &Path) -> Result<Resolver> {
    cfg.validate().context("invalid configuration")?;
    if !output_dir.is_dir() {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("cannot create output directory {}", output_dir.display()))?;
    }
    let signature = cfg.signature();
    tracing::info!(
        source = ?signature.source(),
        marker = %String::from_utf8_lossy(signature.as_bytes()),
        "soft-404 marker loaded"
    );
    Ok(Resolver::new(
        cfg.extension_table(),
        signature,
        output_dir,
        Arc::new(MissLog::new(&cfg.miss_log)),
    ))
}

/// One progress line per finished link.
fn print_resolution(r: &Resolution) {
    match &r.outcome {
        ResolutionOutcome::Resolved { path, bytes, .. } => {
            println!("[found]   {} -> {} ({} bytes)", r.link, path.display(), bytes)
        }
        ResolutionOutcome::Skipped { existing } => {
            println!("[skip]    {} (have {})", r.link, existing.display())
        }
        ResolutionOutcome::Unresolved => {
            println!("[missing] {} ({} candidates tried)", r.link, r.attempts.len())
        }
        ResolutionOutcome::Invalid { reason } => println!("[invalid] {}: {}", r.link, reason),
        ResolutionOutcome::WriteFailed { error, .. } => {
            println!("[failed]  {}: {}", r.link, error)
        }
    }
}
