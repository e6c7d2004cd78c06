//! Per-link resolution results and the attempt trail behind them.

use std::fmt;
use std::path::PathBuf;

use crate::storage::WriteError;

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptKind {
    NotFound(u32),
    Empty,
    SoftNotFound,
    /// Classified genuine and downloaded.
    Genuine,
    /// Probe failed, or the stream broke while downloading a genuine match.
    TransportError(String),
}

impl fmt::Display for AttemptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptKind::NotFound(code) => write!(f, "HTTP {}", code),
            AttemptKind::Empty => f.write_str("empty response"),
            AttemptKind::SoftNotFound => f.write_str("soft 404"),
            AttemptKind::Genuine => f.write_str("genuine"),
            AttemptKind::TransportError(e) => write!(f, "error: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub extension: String,
    pub url: String,
    pub kind: AttemptKind,
}

#[derive(Debug)]
pub enum ResolutionOutcome {
    /// A same-stem file already exists; nothing was fetched.
    Skipped { existing: PathBuf },
    Resolved {
        path: PathBuf,
        extension: String,
        bytes: u64,
    },
    /// Every candidate was missing, a soft 404 or failed.
    Unresolved,
    /// The link has no usable URL or filename.
    Invalid { reason: String },
    /// A genuine match was found but could not be saved.
    WriteFailed { extension: String, error: WriteError },
}

impl ResolutionOutcome {
    /// True for outcomes recorded in the miss log.
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            ResolutionOutcome::Unresolved
                | ResolutionOutcome::Invalid { .. }
                | ResolutionOutcome::WriteFailed { .. }
        )
    }
}

/// Result of resolving one input link.
#[derive(Debug)]
pub struct Resolution {
    pub link: String,
    pub outcome: ResolutionOutcome,
    pub attempts: Vec<Attempt>,
}
