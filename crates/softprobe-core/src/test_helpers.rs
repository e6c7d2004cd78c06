//! Scripted `Prober` for resolver and dispatcher tests.

use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::probe::{Fetch, ProbeError, Prober};

#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Status(u32),
    Body(Vec<u8>),
    /// Sends the bytes, then fails the stream.
    BodyThenFail(Vec<u8>),
    /// Connection refused.
    Refused,
}

/// Tracks how many probes run at the same time across clones.
#[derive(Debug, Default)]
pub(crate) struct Gauge {
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    pub(crate) fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedProber {
    routes: HashMap<String, Scripted>,
    chunk_size: usize,
    pub(crate) probed: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
    gauge: Option<Arc<Gauge>>,
}

impl ScriptedProber {
    pub(crate) fn new() -> Self {
        Self {
            chunk_size: 8192,
            ..Self::default()
        }
    }

    pub(crate) fn route(mut self, url: &str, response: Scripted) -> Self {
        self.routes.insert(url.to_string(), response);
        self
    }

    pub(crate) fn chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = n;
        self
    }

    pub(crate) fn slow(mut self, delay: Duration, gauge: Arc<Gauge>) -> Self {
        self.delay = Some(delay);
        self.gauge = Some(gauge);
        self
    }

    pub(crate) fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }

    fn split(&self, body: Vec<u8>) -> (Vec<u8>, Vec<u8>) {
        let mut first = body;
        let rest = first.split_off(first.len().min(self.chunk_size));
        (first, rest)
    }
}

struct FailAfter(Cursor<Vec<u8>>);

impl Read for FailAfter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.0.read(buf)? {
            0 => Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer")),
            n => Ok(n),
        }
    }
}

impl Prober for ScriptedProber {
    fn probe(&mut self, url: &str) -> Result<Fetch<'_>, ProbeError> {
        self.probed.lock().unwrap().push(url.to_string());
        if let Some(gauge) = &self.gauge {
            gauge.enter();
            std::thread::sleep(self.delay.unwrap_or_default());
            gauge.leave();
        }
        match self.routes.get(url).cloned().unwrap_or(Scripted::Status(404)) {
            Scripted::Status(code) => Ok(Fetch::Status(code)),
            Scripted::Body(body) => {
                let (first_chunk, rest) = self.split(body);
                Ok(Fetch::Body {
                    first_chunk,
                    rest: Box::new(Cursor::new(rest)),
                })
            }
            Scripted::BodyThenFail(body) => {
                let (first_chunk, rest) = self.split(body);
                Ok(Fetch::Body {
                    first_chunk,
                    rest: Box::new(FailAfter(Cursor::new(rest))),
                })
            }
            Scripted::Refused => Err(ProbeError::Transfer(curl::Error::new(7))),
        }
    }
}
