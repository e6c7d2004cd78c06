//! Saved search-result pages: the input side of a run.
//!
//! A pages directory holds files named `<prefix>*.htm*`. Every
//! `div.result-item` in them carries one link (its first anchor's `href`).

use anyhow::{anyhow, Context, Result};
use scraper::{Html, Selector};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dispatch::dedup_links;

/// Lists result pages in `dir`, sorted by name. An unreadable directory is an error.
pub fn discover(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("cannot read pages directory {}", dir.display()))?;
    let mut pages: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix(prefix))
                .is_some_and(|rest| rest.contains(".htm"))
        })
        .collect();
    pages.sort();
    Ok(pages)
}

/// Pulls result links out of page HTML.
#[derive(Debug)]
pub struct LinkExtractor {
    item: Selector,
    anchor: Selector,
}

impl LinkExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            item: parse_selector("div.result-item")?,
            anchor: parse_selector("a")?,
        })
    }

    /// One link per result item, in document order. Items whose first
    /// anchor has no (or an empty) `href` are skipped.
    pub fn extract(&self, html: &str) -> Vec<String> {
        let doc = Html::parse_document(html);
        doc.select(&self.item)
            .filter_map(|div| div.select(&self.anchor).next())
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {:?}: {}", css, e))
}

/// Every distinct link from every page under `dir`, first occurrence order.
///
/// A page that cannot be read is logged and skipped.
pub fn collect_links(dir: &Path, prefix: &str) -> Result<Vec<String>> {
    let pages = discover(dir, prefix)?;
    let extractor = LinkExtractor::new()?;
    let mut links = Vec::new();
    for page in &pages {
        let bytes = match fs::read(page) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(page = %page.display(), error = %e, "skipping unreadable page");
                continue;
            }
        };
        let found = extractor.extract(&String::from_utf8_lossy(&bytes));
        tracing::debug!(page = %page.display(), links = found.len(), "scanned page");
        links.extend(found);
    }
    let links = dedup_links(links);
    tracing::info!(pages = pages.len(), links = links.len(), "collected links");
    Ok(links)
}
