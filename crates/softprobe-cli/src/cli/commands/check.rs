//! `softprobe check` – walk every candidate for one link and report each verdict.

use anyhow::Result;
use softprobe_core::config::SoftprobeConfig;
use softprobe_core::probe::ProbeClient;
use softprobe_core::resolver::ResolutionOutcome;
use std::path::Path;

use super::build_resolver;

pub fn run_check(cfg: &SoftprobeConfig, output_dir: &Path, link: &str, prefix: &str) -> Result<()> {
    let resolver = build_resolver(cfg, output_dir)?
        .with_file_prefix(prefix)
        .without_miss_log();
    let mut client = ProbeClient::new(cfg.probe_settings());

    println!("Testing link: {}", link);
    let r = resolver.resolve_observed(link, &mut client, |a| {
        println!("Checking: {}  [{}]", a.url, a.kind);
    });

    match r.outcome {
        ResolutionOutcome::Resolved { path, bytes, .. } => {
            println!("Downloaded {} ({} bytes)", path.display(), bytes);
        }
        ResolutionOutcome::Skipped { existing } => {
            println!("Already present: {}", existing.display());
        }
        ResolutionOutcome::Unresolved => {
            println!("No valid file found for any of {} extensions.", r.attempts.len());
        }
        ResolutionOutcome::Invalid { reason } => anyhow::bail!("invalid link {}: {}", link, reason),
        ResolutionOutcome::WriteFailed { error, .. } => return Err(error.into()),
    }
    Ok(())
}
