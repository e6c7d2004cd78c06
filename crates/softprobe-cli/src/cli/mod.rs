//! CLI for the softprobe soft-404 resolver.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use softprobe_core::config::{self, SoftprobeConfig};
use std::path::PathBuf;

use commands::{run_check, run_extensions, run_pages, run_resolve};

/// Top-level CLI for softprobe.
#[derive(Debug, Parser)]
#[command(name = "softprobe")]
#[command(
    about = "softprobe: find the real extension behind links on a soft-404 site",
    long_about = None
)]
pub struct Cli {
    /// Config file to use instead of ~/.config/softprobe/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Per-run overrides for config values.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Resolve up to N links concurrently.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,
    /// Bytes read from each response before classifying it.
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<usize>,
    /// Directory downloads are saved to (default: current directory).
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
    /// File that collects unresolved links.
    #[arg(long, value_name = "FILE")]
    pub miss_log: Option<PathBuf>,
    /// Saved not-found page whose <title> identifies soft 404s.
    #[arg(long, value_name = "FILE")]
    pub signature_page: Option<PathBuf>,
}

impl Overrides {
    fn apply(&self, cfg: &mut SoftprobeConfig) {
        if let Some(n) = self.workers {
            cfg.workers = n;
        }
        if let Some(n) = self.chunk_size {
            cfg.chunk_size = n;
        }
        if let Some(p) = &self.miss_log {
            cfg.miss_log = p.clone();
        }
        if let Some(p) = &self.signature_page {
            cfg.signature_page = Some(p.clone());
            // An explicit page beats a marker from the config file.
            cfg.signature_marker = None;
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Scan saved result pages and resolve every link in them.
    Run {
        /// Directory holding the saved result pages.
        #[arg(long, value_name = "DIR")]
        pages_dir: Option<PathBuf>,
        /// Only pages named <PREFIX>*.htm* are scanned.
        #[arg(long, value_name = "PREFIX")]
        page_prefix: Option<String>,
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Resolve the given links.
    Resolve {
        /// Links as they appear on the site (their extension is ignored).
        #[arg(required = true, value_name = "LINK")]
        links: Vec<String>,
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Show every candidate tried for one link and save the first real match under a prefix.
    Check {
        /// Link to check.
        link: String,
        /// Prefix for the saved file name.
        #[arg(long, default_value = "TEST_")]
        prefix: String,
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print the extension table in probe order.
    Extensions,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = match &cli.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                pages_dir,
                page_prefix,
                overrides,
            } => {
                if let Some(dir) = pages_dir {
                    cfg.pages_dir = dir;
                }
                if let Some(prefix) = page_prefix {
                    cfg.page_prefix = prefix;
                }
                overrides.apply(&mut cfg);
                run_pages(&cfg, &output_dir(&overrides)?)?;
            }
            CliCommand::Resolve { links, overrides } => {
                overrides.apply(&mut cfg);
                run_resolve(&cfg, &output_dir(&overrides)?, links)?;
            }
            CliCommand::Check {
                link,
                prefix,
                overrides,
            } => {
                overrides.apply(&mut cfg);
                run_check(&cfg, &output_dir(&overrides)?, &link, &prefix)?;
            }
            CliCommand::Extensions => run_extensions(&cfg)?,
        }

        Ok(())
    }
}

fn output_dir(overrides: &Overrides) -> Result<PathBuf> {
    match &overrides.output_dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(std::env::current_dir()?),
    }
}

#[cfg(test)]
mod tests;
