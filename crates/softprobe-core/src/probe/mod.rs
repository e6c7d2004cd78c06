//! Probe client: one streamed HTTP GET per candidate URL.
//!
//! Uses a `curl::multi` handle driven from the calling thread so the body can
//! be pulled incrementally: the first chunk is buffered for classification
//! and the rest of the same transfer is handed out as a `Read` stream only if
//! the caller decides to keep it. One client is meant to serve one resolver
//! invocation; its multi handle and reused easy handle keep connections alive
//! across that link's candidates.

mod error;
mod handler;
mod identity;
mod transfer;

pub use error::ProbeError;
pub use identity::{BrowserIdentity, CONSENT_COOKIE};

use std::io::{Cursor, Read};
use std::time::Duration;

use handler::BodyHandler;
use transfer::Transfer;

/// Raw response to a probe, before classification.
pub enum Fetch<'a> {
    /// Final status was not 200; the body was not read.
    Status(u32),
    /// 200 response: up to `chunk_size` leading bytes plus the unread remainder.
    Body {
        first_chunk: Vec<u8>,
        rest: Box<dyn Read + 'a>,
    },
}

impl std::fmt::Debug for Fetch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fetch::Status(code) => f.debug_tuple("Status").field(code).finish(),
            Fetch::Body { first_chunk, .. } => f
                .debug_struct("Body")
                .field("first_chunk_len", &first_chunk.len())
                .finish_non_exhaustive(),
        }
    }
}

/// Seam between the resolver and the network.
pub trait Prober {
    /// GETs `url` and returns its status or its first chunk plus remaining stream.
    fn probe(&mut self, url: &str) -> Result<Fetch<'_>, ProbeError>;
}

/// Per-client transfer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    /// Bytes buffered before the response is classified.
    pub chunk_size: usize,
    pub connect_timeout: Duration,
    /// Abort when throughput stays under 1 KiB/s for this long.
    pub stall_timeout: Duration,
    /// Hard cap on one transfer, including the download.
    pub request_timeout: Duration,
    pub identity: BrowserIdentity,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            chunk_size: 8192,
            connect_timeout: Duration::from_secs(30),
            stall_timeout: Duration::from_secs(60),
            request_timeout: Duration::from_secs(3600),
            identity: BrowserIdentity::default(),
        }
    }
}

const LOW_SPEED_LIMIT_BYTES: u32 = 1024;
const MAX_REDIRECTS: u32 = 10;

/// curl-backed `Prober`.
pub struct ProbeClient {
    multi: curl::multi::Multi,
    easy: Option<curl::easy::Easy2<BodyHandler>>,
    settings: ProbeSettings,
}

impl ProbeClient {
    pub fn new(settings: ProbeSettings) -> Self {
        curl::init();
        Self {
            multi: curl::multi::Multi::new(),
            easy: None,
            settings,
        }
    }

    /// Reuses the previous easy handle (keeps its connection) or builds a new one.
    fn take_easy(&mut self) -> Result<curl::easy::Easy2<BodyHandler>, ProbeError> {
        match self.easy.take() {
            Some(mut easy) => {
                easy.get_mut().reset();
                Ok(easy)
            }
            None => configure_easy(&self.settings).map_err(ProbeError::Setup),
        }
    }
}

impl Prober for ProbeClient {
    fn probe(&mut self, url: &str) -> Result<Fetch<'_>, ProbeError> {
        let chunk_size = self.settings.chunk_size.max(1);
        let mut easy = self.take_easy()?;
        easy.url(url).map_err(ProbeError::Setup)?;
        let handle = self.multi.add2(easy)?;
        let mut transfer = Transfer::new(&self.multi, &mut self.easy, handle);

        loop {
            let h = transfer.handler();
            if h.rejected() || transfer.is_done() || h.pending() >= chunk_size {
                break;
            }
            transfer.step()?;
        }

        if transfer.handler().rejected() || transfer.is_done() {
            // Whole response is in (or refused at the status line).
            let rejected = transfer.handler().rejected();
            let body = transfer.take_prefix(usize::MAX);
            let code = transfer.finish()?;
            if rejected || code != 200 {
                tracing::debug!(url, code, "probe: non-200 status");
                return Ok(Fetch::Status(code));
            }
            let split = body.len().min(chunk_size);
            let mut first_chunk = body;
            let rest = first_chunk.split_off(split);
            return Ok(Fetch::Body {
                first_chunk,
                rest: Box::new(Cursor::new(rest)),
            });
        }

        let first_chunk = transfer.take_prefix(chunk_size);
        Ok(Fetch::Body {
            first_chunk,
            rest: Box::new(transfer),
        })
    }
}

fn configure_easy(
    settings: &ProbeSettings,
) -> Result<curl::easy::Easy2<BodyHandler>, curl::Error> {
    let id = &settings.identity;
    let mut easy = curl::easy::Easy2::new(BodyHandler::default());
    easy.follow_location(true)?;
    easy.max_redirections(MAX_REDIRECTS)?;
    easy.connect_timeout(settings.connect_timeout)?;
    easy.low_speed_limit(LOW_SPEED_LIMIT_BYTES)?;
    easy.low_speed_time(settings.stall_timeout)?;
    easy.timeout(settings.request_timeout)?;
    easy.useragent(&id.user_agent)?;
    // Sends the header and lets libcurl decode the response body.
    let version = curl::Version::get();
    let coding = id.decodable_encoding(version.feature_libz(), version.feature_brotli());
    easy.accept_encoding(&coding)?;
    if !id.cookie.is_empty() {
        easy.cookie(&id.cookie)?;
    }
    let mut list = curl::easy::List::new();
    for line in id.header_lines() {
        list.append(&line)?;
    }
    easy.http_headers(list)?;
    Ok(easy)
}
