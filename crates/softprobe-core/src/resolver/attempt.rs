//! One candidate attempt: probe, then classify the first chunk.

use std::io::Read;

use crate::classify::{classify, Verdict};
use crate::probe::{Fetch, ProbeError, Prober};
use crate::signature::SignatureMarker;

/// Outcome of probing one candidate.
pub enum ProbeResult<'a> {
    /// Non-200 final status.
    NotFound(u32),
    /// 200 with an empty body.
    Empty,
    /// 200 with HTML or the not-found signature.
    SoftNotFound,
    /// Real content; `rest` continues the same response after `first_chunk`.
    Genuine {
        first_chunk: Vec<u8>,
        rest: Box<dyn Read + 'a>,
    },
    TransportError(ProbeError),
}

pub(crate) fn probe_candidate<'p, P: Prober + ?Sized>(
    prober: &'p mut P,
    url: &str,
    signature: &SignatureMarker,
) -> ProbeResult<'p> {
    match prober.probe(url) {
        Ok(Fetch::Status(code)) => ProbeResult::NotFound(code),
        Ok(Fetch::Body { first_chunk, rest }) => match classify(&first_chunk, signature) {
            Verdict::Empty => ProbeResult::Empty,
            Verdict::SoftNotFound => ProbeResult::SoftNotFound,
            Verdict::Genuine => ProbeResult::Genuine { first_chunk, rest },
        },
        Err(e) => ProbeResult::TransportError(e),
    }
}
