//! Extension table and candidate generation.
//!
//! The table is data: an ordered list of media categories, each with an
//! ordered list of extensions. Order is priority; the first genuine match for
//! a base link wins even if a later extension would also match.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::url_model::BaseLink;

/// Media category an extension belongs to (used for grouping and display).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Video,
    Image,
    Audio,
    Archive,
    Document,
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MediaCategory::Video => "video",
            MediaCategory::Image => "image",
            MediaCategory::Audio => "audio",
            MediaCategory::Archive => "archive",
            MediaCategory::Document => "document",
        };
        f.pad(s)
    }
}

/// One category's extensions as they appear in config.toml (`[[extensions]]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionGroup {
    pub category: MediaCategory,
    pub extensions: Vec<String>,
}

const VIDEO: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "flv", "wmv", "webm", "m4v", "mpg", "mpeg", "3gp", "ts", "mts",
    "m2ts", "vob", "ogv", "qt", "rm", "rmvb", "asf", "amv", "m4p", "mpe", "mpv", "m2v", "svi",
    "3g2", "mxf", "roq", "nsv", "f4v", "f4p", "f4a", "f4b",
];
const IMAGE: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "svg", "tiff", "tif", "ico", "heic", "heif", "raw",
    "cr2", "nef", "orf", "sr2", "psd", "ai", "eps", "indd", "cdr", "xcf",
];
const AUDIO: &[&str] = &["mp3", "wav", "aac", "flac", "ogg", "m4a"];
const ARCHIVE: &[&str] = &["zip", "rar", "7z", "tar", "gz"];
const DOCUMENT: &[&str] = &["pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt"];

/// Built-in groups in priority order: video, image, audio, archive, document.
pub fn default_groups() -> Vec<ExtensionGroup> {
    [
        (MediaCategory::Video, VIDEO),
        (MediaCategory::Image, IMAGE),
        (MediaCategory::Audio, AUDIO),
        (MediaCategory::Archive, ARCHIVE),
        (MediaCategory::Document, DOCUMENT),
    ]
    .into_iter()
    .map(|(category, exts)| ExtensionGroup {
        category,
        extensions: exts.iter().map(|e| e.to_string()).collect(),
    })
    .collect()
}

/// Normalizes a configured extension: trims, drops leading dots, lowercases.
/// Returns `None` if nothing is left.
pub fn normalize_extension(ext: &str) -> Option<String> {
    let e = ext.trim().trim_start_matches('.').to_ascii_lowercase();
    if e.is_empty() {
        None
    } else {
        Some(e)
    }
}

/// A table entry: extension (no dot) and its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub name: String,
    pub category: MediaCategory,
}

/// Ordered, de-duplicated extension table. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionTable {
    entries: Vec<Extension>,
}

impl ExtensionTable {
    /// Builds a table from groups in declaration order. Extensions are
    /// normalized; blanks are skipped and repeats keep their first position.
    pub fn from_groups(groups: &[ExtensionGroup]) -> Self {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for group in groups {
            for raw in &group.extensions {
                let Some(name) = normalize_extension(raw) else {
                    continue;
                };
                if seen.insert(name.clone()) {
                    entries.push(Extension {
                        name,
                        category: group.category,
                    });
                }
            }
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[Extension] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Candidates for `base`, one per extension, in table order.
    pub fn candidates<'t>(&'t self, base: &'t BaseLink) -> impl Iterator<Item = Candidate> + 't {
        self.entries.iter().map(move |ext| Candidate {
            url: base.with_extension(&ext.name),
            extension: ext.name.clone(),
        })
    }
}

impl Default for ExtensionTable {
    fn default() -> Self {
        Self::from_groups(&default_groups())
    }
}

/// One (base link, extension) pairing to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub extension: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(category: MediaCategory, exts: &[&str]) -> ExtensionGroup {
        ExtensionGroup {
            category,
            extensions: exts.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn default_table_starts_with_video_and_ends_with_documents() {
        let t = ExtensionTable::default();
        let names: Vec<&str> = t.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"mp4"));
        assert_eq!(names.last(), Some(&"txt"));
        assert_eq!(t.len(), VIDEO.len() + IMAGE.len() + AUDIO.len() + ARCHIVE.len() + DOCUMENT.len());
        let pdf = t.entries().iter().find(|e| e.name == "pdf").unwrap();
        assert_eq!(pdf.category, MediaCategory::Document);
    }

    #[test]
    fn repeats_keep_first_position() {
        let t = ExtensionTable::from_groups(&[
            group(MediaCategory::Document, &[".PDF", "txt"]),
            group(MediaCategory::Archive, &["zip", "pdf", " ", "."]),
        ]);
        let names: Vec<&str> = t.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["pdf", "txt", "zip"]);
        assert_eq!(t.entries()[0].category, MediaCategory::Document);
    }

    #[test]
    fn candidates_follow_table_order_and_are_stable() {
        let t = ExtensionTable::from_groups(&[group(MediaCategory::Document, &["pdf", "txt"])]);
        let base = BaseLink::parse("http://x/doc").unwrap();
        let first: Vec<Candidate> = t.candidates(&base).collect();
        let second: Vec<Candidate> = t.candidates(&base).collect();
        assert_eq!(first, second);
        assert_eq!(first[0].url, "http://x/doc.pdf");
        assert_eq!(first[1].url, "http://x/doc.txt");
        assert_eq!(first[1].extension, "txt");
    }

    #[test]
    fn normalize_extension_cases() {
        assert_eq!(normalize_extension(".Mp4").as_deref(), Some("mp4"));
        assert_eq!(normalize_extension("  7z "), Some("7z".to_string()));
        assert_eq!(normalize_extension(".."), None);
    }
}
