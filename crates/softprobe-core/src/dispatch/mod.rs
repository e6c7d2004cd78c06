//! Bounded worker pool: resolves many links concurrently.
//!
//! Workers pull links from a shared queue and run one resolution to
//! completion before taking the next. Results come back over a channel in
//! completion order, not input order.

mod summary;

pub use summary::RunSummary;

use std::collections::{HashSet, VecDeque};
use std::sync::{mpsc, Mutex};

use crate::probe::Prober;
use crate::resolver::{Resolution, Resolver};

/// Default number of concurrent resolutions.
pub const DEFAULT_WORKERS: usize = 5;

/// Drops repeated links, keeping the first occurrence's position.
pub fn dedup_links<I>(links: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    links
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty() && seen.insert(l.clone()))
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    workers: usize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

impl Dispatcher {
    /// Width is clamped to at least 1.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Resolves every link with at most `workers` resolutions in flight.
    ///
    /// `make_prober` is called on the worker thread once per link, so each
    /// resolution owns its connection. `on_result` runs on the calling
    /// thread as each link finishes.
    pub fn run<P, F, C>(
        &self,
        links: Vec<String>,
        resolver: &Resolver,
        make_prober: F,
        mut on_result: C,
    ) -> RunSummary
    where
        P: Prober,
        F: Fn() -> P + Sync,
        C: FnMut(&Resolution),
    {
        let links = dedup_links(links);
        let count = links.len();
        let mut summary = RunSummary::default();
        if count == 0 {
            return summary;
        }
        let num_workers = self.workers.min(count);
        tracing::info!(links = count, workers = num_workers, "dispatching");

        let work: Mutex<VecDeque<String>> = Mutex::new(links.into_iter().collect());
        let (tx, rx) = mpsc::channel::<Resolution>();

        std::thread::scope(|s| {
            for _ in 0..num_workers {
                let tx = tx.clone();
                let work = &work;
                let make_prober = &make_prober;
                s.spawn(move || loop {
                    let next = match work.lock() {
                        Ok(mut q) => q.pop_front(),
                        Err(_) => None,
                    };
                    let Some(link) = next else {
                        break;
                    };
                    let mut prober = make_prober();
                    let resolution = resolver.resolve(&link, &mut prober);
                    if tx.send(resolution).is_err() {
                        break;
                    }
                });
            }
            drop(tx);

            for resolution in rx {
                summary.record(&resolution.outcome);
                on_result(&resolution);
            }
        });

        if summary.total() < count {
            tracing::error!(
                expected = count,
                received = summary.total(),
                "worker exited early (panic?)"
            );
        }
        tracing::info!(
            resolved = summary.resolved,
            skipped = summary.skipped,
            unresolved = summary.unresolved,
            invalid = summary.invalid,
            write_failed = summary.write_failed,
            "run finished"
        );
        summary
    }
}
