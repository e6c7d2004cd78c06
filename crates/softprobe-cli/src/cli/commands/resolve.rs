//! `softprobe resolve` – resolve links given on the command line.

use anyhow::Result;
use softprobe_core::config::SoftprobeConfig;
use softprobe_core::dispatch::Dispatcher;
use softprobe_core::probe::ProbeClient;
use std::path::Path;

use super::{build_resolver, print_resolution};

pub fn run_resolve(cfg: &SoftprobeConfig, output_dir: &Path, links: Vec<String>) -> Result<()> {
    dispatch(cfg, output_dir, links)
}

/// Runs `links` through the worker pool and prints the per-link lines and a summary.
pub(super) fn dispatch(cfg: &SoftprobeConfig, output_dir: &Path, links: Vec<String>) -> Result<()> {
    let resolver = build_resolver(cfg, output_dir)?;
    let settings = cfg.probe_settings();
    let summary = Dispatcher::new(cfg.workers).run(
        links,
        &resolver,
        || ProbeClient::new(settings.clone()),
        print_resolution,
    );
    println!(
        "Done: {} downloaded, {} skipped, {} missing, {} invalid, {} failed",
        summary.resolved, summary.skipped, summary.unresolved, summary.invalid, summary.write_failed
    );
    if let Some(log) = resolver.miss_log().filter(|_| summary.misses() > 0) {
        println!("Unresolved links appended to {}", log.path().display());
    }
    Ok(())
}
