use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::extensions::{normalize_extension, ExtensionGroup, ExtensionTable};
use crate::probe::{BrowserIdentity, ProbeSettings};
use crate::signature::SignatureMarker;

/// Invalid values in an otherwise well-formed config file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("workers must be at least 1")]
    ZeroWorkers,
    #[error("chunk_size must be at least 1 byte")]
    ZeroChunkSize,
    #[error("empty extension in [[extensions]] group {0}")]
    EmptyExtension(String),
    #[error("extension table is empty")]
    NoExtensions,
}

/// Global configuration loaded from `~/.config/softprobe/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftprobeConfig {
    /// Maximum number of links resolved concurrently.
    pub workers: usize,
    /// Bytes read from each 200 response before classifying it.
    pub chunk_size: usize,
    /// TCP/TLS connect timeout per probe.
    pub connect_timeout_secs: u64,
    /// Abort a transfer that stays under 1 KiB/s for this long.
    pub stall_timeout_secs: u64,
    /// Hard cap on a single transfer, download included.
    pub request_timeout_secs: u64,
    /// File that collects links no extension could resolve.
    pub miss_log: PathBuf,
    /// Directory holding saved result pages.
    pub pages_dir: PathBuf,
    /// Result pages are files named `<page_prefix>*.htm*`.
    pub page_prefix: String,
    /// Saved copy of the site's not-found page; its `<title>` is the marker.
    #[serde(default)]
    pub signature_page: Option<PathBuf>,
    /// Explicit marker string; takes precedence over `signature_page`.
    #[serde(default)]
    pub signature_marker: Option<String>,
    /// Browser identity sent with every probe (built-in default if missing).
    #[serde(default)]
    pub identity: Option<BrowserIdentity>,
    /// Ordered extension groups (built-in table if missing).
    #[serde(default)]
    pub extensions: Option<Vec<ExtensionGroup>>,
}

impl Default for SoftprobeConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            chunk_size: 8192,
            connect_timeout_secs: 30,
            stall_timeout_secs: 60,
            request_timeout_secs: 3600,
            miss_log: PathBuf::from("missing_files.txt"),
            pages_dir: PathBuf::from("html"),
            page_prefix: "p".to_string(),
            signature_page: Some(PathBuf::from("html/examplebad.htm")),
            signature_marker: None,
            identity: None,
            extensions: None,
        }
    }
}

impl SoftprobeConfig {
    /// Checks values serde cannot: non-zero sizes and a usable extension table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if let Some(groups) = &self.extensions {
            for g in groups {
                if g.extensions.iter().any(|e| normalize_extension(e).is_none()) {
                    return Err(ConfigError::EmptyExtension(g.category.to_string()));
                }
            }
            if groups.iter().all(|g| g.extensions.is_empty()) {
                return Err(ConfigError::NoExtensions);
            }
        }
        Ok(())
    }

    /// The effective extension table.
    pub fn extension_table(&self) -> ExtensionTable {
        match &self.extensions {
            Some(groups) => ExtensionTable::from_groups(groups),
            None => ExtensionTable::default(),
        }
    }

    /// Loads the soft-404 marker once, from the configured sources.
    pub fn signature(&self) -> SignatureMarker {
        SignatureMarker::load(
            self.signature_marker.as_deref(),
            self.signature_page.as_deref(),
        )
    }

    /// Probe client settings derived from this config.
    pub fn probe_settings(&self) -> ProbeSettings {
        ProbeSettings {
            chunk_size: self.chunk_size,
            connect_timeout: std::time::Duration::from_secs(self.connect_timeout_secs),
            stall_timeout: std::time::Duration::from_secs(self.stall_timeout_secs),
            request_timeout: std::time::Duration::from_secs(self.request_timeout_secs),
            identity: self.identity.clone().unwrap_or_default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("softprobe")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load and validate configuration from `path`.
pub fn load_from(path: &Path) -> Result<SoftprobeConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: SoftprobeConfig = toml::from_str(&data)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SoftprobeConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SoftprobeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::MediaCategory;

    const MINIMAL: &str = r#"
        workers = 2
        chunk_size = 4096
        connect_timeout_secs = 10
        stall_timeout_secs = 20
        request_timeout_secs = 600
        miss_log = "misses.txt"
        pages_dir = "saved"
        page_prefix = "page"
    "#;

    #[test]
    fn default_config_values() {
        let cfg = SoftprobeConfig::default();
        assert_eq!(cfg.workers, 5);
        assert_eq!(cfg.chunk_size, 8192);
        assert_eq!(cfg.miss_log, PathBuf::from("missing_files.txt"));
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.extension_table(), ExtensionTable::default());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = SoftprobeConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: SoftprobeConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.workers, cfg.workers);
        assert_eq!(parsed.chunk_size, cfg.chunk_size);
        assert_eq!(parsed.signature_page, cfg.signature_page);
        assert_eq!(parsed.page_prefix, cfg.page_prefix);
    }

    #[test]
    fn config_toml_custom_values() {
        let cfg: SoftprobeConfig = toml::from_str(MINIMAL).unwrap();
        assert_eq!(cfg.workers, 2);
        assert_eq!(cfg.chunk_size, 4096);
        assert_eq!(cfg.pages_dir, PathBuf::from("saved"));
        assert!(cfg.signature_page.is_none());
        assert!(cfg.identity.is_none());
        let settings = cfg.probe_settings();
        assert_eq!(settings.chunk_size, 4096);
        assert_eq!(settings.stall_timeout.as_secs(), 20);
        assert_eq!(settings.identity, BrowserIdentity::default());
    }

    #[test]
    fn config_toml_extension_groups_replace_builtin_table() {
        let toml = format!(
            "{}\n{}",
            MINIMAL,
            r#"
            [[extensions]]
            category = "document"
            extensions = [".pdf", "txt"]

            [[extensions]]
            category = "video"
            extensions = ["mp4"]
            "#
        );
        let cfg: SoftprobeConfig = toml::from_str(&toml).unwrap();
        assert!(cfg.validate().is_ok());
        let table = cfg.extension_table();
        let names: Vec<&str> = table.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["pdf", "txt", "mp4"]);
        assert_eq!(table.entries()[2].category, MediaCategory::Video);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = SoftprobeConfig::default();
        cfg.workers = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroWorkers));

        let mut cfg = SoftprobeConfig::default();
        cfg.chunk_size = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroChunkSize));

        let mut cfg = SoftprobeConfig::default();
        cfg.extensions = Some(vec![ExtensionGroup {
            category: MediaCategory::Audio,
            extensions: vec![".".to_string()],
        }]);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::EmptyExtension("audio".to_string()))
        );

        cfg.extensions = Some(vec![]);
        assert_eq!(cfg.validate(), Err(ConfigError::NoExtensions));
    }

    #[test]
    fn load_from_reports_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, MINIMAL.replace("workers = 2", "workers = 0")).unwrap();
        let err = load_from(&path).unwrap_err();
        assert!(err.to_string().contains("workers"));

        fs::write(&path, MINIMAL).unwrap();
        assert_eq!(load_from(&path).unwrap().workers, 2);
    }
}
