//! Per-link resolution: skip check, then candidates in table order until the
//! first genuine response, which is streamed to disk.
//!
//! Transport errors, non-200 statuses, empty bodies and soft 404s all just
//! advance to the next extension. A link that runs out of candidates, has no
//! usable URL, or whose genuine match cannot be written is appended to the
//! miss log.

mod attempt;
mod download;
mod outcome;

pub use attempt::ProbeResult;
pub use outcome::{Attempt, AttemptKind, Resolution, ResolutionOutcome};

use std::path::PathBuf;
use std::sync::Arc;

use crate::extensions::ExtensionTable;
use crate::probe::Prober;
use crate::signature::SignatureMarker;
use crate::storage::{find_existing, MissLog};
use crate::url_model::BaseLink;

use attempt::probe_candidate;
use download::{save_stream, DownloadError};

/// Shared, read-only state for resolving links. One instance serves every
/// worker; each resolution brings its own `Prober`.
#[derive(Debug)]
pub struct Resolver {
    table: ExtensionTable,
    signature: SignatureMarker,
    output_dir: PathBuf,
    file_prefix: String,
    miss_log: Option<Arc<MissLog>>,
}

impl Resolver {
    pub fn new(
        table: ExtensionTable,
        signature: SignatureMarker,
        output_dir: impl Into<PathBuf>,
        miss_log: Arc<MissLog>,
    ) -> Self {
        Self {
            table,
            signature,
            output_dir: output_dir.into(),
            file_prefix: String::new(),
            miss_log: Some(miss_log),
        }
    }

    /// Prefix for local filenames (and the skip check), e.g. `TEST_`.
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Misses are only logged through `tracing`. Used by one-off checks.
    pub fn without_miss_log(mut self) -> Self {
        self.miss_log = None;
        self
    }

    pub fn miss_log(&self) -> Option<&MissLog> {
        self.miss_log.as_deref()
    }

    fn local_stem(&self, base: &BaseLink) -> String {
        format!("{}{}", self.file_prefix, base.stem())
    }

    fn record_miss(&self, link: &str) {
        let Some(miss_log) = &self.miss_log else {
            return;
        };
        if let Err(e) = miss_log.append(link) {
            tracing::warn!(
                link,
                path = %miss_log.path().display(),
                error = %e,
                "could not append to miss log"
            );
        }
    }

    fn finish(&self, link: &str, outcome: ResolutionOutcome, attempts: Vec<Attempt>) -> Resolution {
        if outcome.is_miss() {
            self.record_miss(link);
        }
        Resolution {
            link: link.to_string(),
            outcome,
            attempts,
        }
    }

    /// Resolves one input link using `prober` for every candidate.
    pub fn resolve<P: Prober + ?Sized>(&self, link: &str, prober: &mut P) -> Resolution {
        self.resolve_observed(link, prober, |_| {})
    }

    /// Like [`Resolver::resolve`], calling `on_attempt` as soon as each
    /// candidate is settled. A genuine match is reported once its download
    /// has finished or failed.
    pub fn resolve_observed<P, F>(&self, link: &str, prober: &mut P, mut on_attempt: F) -> Resolution
    where
        P: Prober + ?Sized,
        F: FnMut(&Attempt),
    {
        let base = match BaseLink::parse(link) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(link, error = %e, "invalid link");
                let outcome = ResolutionOutcome::Invalid {
                    reason: e.to_string(),
                };
                return self.finish(link.trim(), outcome, Vec::new());
            }
        };
        let link = base.original();

        let stem = self.local_stem(&base);
        if let Some(existing) = find_existing(&self.output_dir, &stem) {
            tracing::debug!(link, existing = %existing.display(), "already downloaded, skipping");
            return self.finish(link, ResolutionOutcome::Skipped { existing }, Vec::new());
        }

        tracing::info!(link, candidates = self.table.len(), "processing link");
        let mut attempts = Vec::new();

        for candidate in self.table.candidates(&base) {
            let kind = match probe_candidate(prober, &candidate.url, &self.signature) {
                ProbeResult::Genuine {
                    first_chunk,
                    mut rest,
                } => {
                    tracing::info!(url = %candidate.url, "found match");
                    let final_path = self.output_dir.join(format!(
                        "{}{}",
                        self.file_prefix,
                        base.file_name(&candidate.extension)
                    ));
                    match save_stream(&final_path, &first_chunk, &mut *rest) {
                        Ok((path, bytes)) => {
                            tracing::info!(path = %path.display(), bytes, "file downloaded");
                            settle(
                                &mut attempts,
                                &mut on_attempt,
                                Attempt {
                                    extension: candidate.extension.clone(),
                                    url: candidate.url,
                                    kind: AttemptKind::Genuine,
                                },
                            );
                            let outcome = ResolutionOutcome::Resolved {
                                path,
                                extension: candidate.extension,
                                bytes,
                            };
                            return self.finish(link, outcome, attempts);
                        }
                        Err(DownloadError::Stream(e)) => {
                            tracing::warn!(url = %candidate.url, error = %e, "download stream failed");
                            AttemptKind::TransportError(e.to_string())
                        }
                        Err(DownloadError::Write(error)) => {
                            tracing::error!(url = %candidate.url, error = %error, "could not save download");
                            settle(
                                &mut attempts,
                                &mut on_attempt,
                                Attempt {
                                    extension: candidate.extension.clone(),
                                    url: candidate.url,
                                    kind: AttemptKind::Genuine,
                                },
                            );
                            let outcome = ResolutionOutcome::WriteFailed {
                                extension: candidate.extension,
                                error,
                            };
                            return self.finish(link, outcome, attempts);
                        }
                    }
                }
                ProbeResult::NotFound(code) => AttemptKind::NotFound(code),
                ProbeResult::Empty => AttemptKind::Empty,
                ProbeResult::SoftNotFound => AttemptKind::SoftNotFound,
                ProbeResult::TransportError(e) => {
                    tracing::warn!(
                        url = %candidate.url,
                        error = %e,
                        timeout = e.is_timeout(),
                        connection = e.is_connection(),
                        "probe failed"
                    );
                    AttemptKind::TransportError(e.to_string())
                }
            };
            tracing::debug!(url = %candidate.url, result = %kind, "candidate rejected");
            settle(
                &mut attempts,
                &mut on_attempt,
                Attempt {
                    extension: candidate.extension,
                    url: candidate.url,
                    kind,
                },
            );
        }

        tracing::info!(link, base = base.base_url(), "no valid file found");
        self.finish(link, ResolutionOutcome::Unresolved, attempts)
    }
}

fn settle<F: FnMut(&Attempt)>(attempts: &mut Vec<Attempt>, on_attempt: &mut F, attempt: Attempt) {
    on_attempt(&attempt);
    attempts.push(attempt);
}
