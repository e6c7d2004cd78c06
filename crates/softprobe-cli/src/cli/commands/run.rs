//! `softprobe run` – resolve every link found in the saved result pages.

use anyhow::Result;
use softprobe_core::config::SoftprobeConfig;
use softprobe_core::pages;
use std::path::Path;

use super::resolve::dispatch;

pub fn run_pages(cfg: &SoftprobeConfig, output_dir: &Path) -> Result<()> {
    let links = pages::collect_links(&cfg.pages_dir, &cfg.page_prefix)?;
    println!(
        "Found {} unique link(s) in {}",
        links.len(),
        cfg.pages_dir.display()
    );
    dispatch(cfg, output_dir, links)
}
