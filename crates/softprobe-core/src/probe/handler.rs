//! Easy2 handler that tracks the final status line and buffers body bytes
//! until the reader pulls them.

use std::str;

#[derive(Debug, Default)]
pub(crate) struct BodyHandler {
    status: Option<u32>,
    body: Vec<u8>,
    /// Bytes of `body` already handed to the reader.
    consumed: usize,
    /// Set when the body was refused because the status is not 200.
    rejected: bool,
}

impl BodyHandler {
    pub(crate) const fn idle() -> Self {
        Self {
            status: None,
            body: Vec::new(),
            consumed: 0,
            rejected: false,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn rejected(&self) -> bool {
        self.rejected
    }

    /// Buffered bytes not yet handed out.
    pub(crate) fn pending(&self) -> usize {
        self.body.len() - self.consumed
    }

    /// Removes and returns up to `max` pending bytes.
    pub(crate) fn take_prefix(&mut self, max: usize) -> Vec<u8> {
        let end = self.consumed + self.pending().min(max);
        let out = self.body[self.consumed..end].to_vec();
        self.advance(end - self.consumed);
        out
    }

    /// Copies pending bytes into `buf`; returns how many were copied.
    pub(crate) fn drain_into(&mut self, buf: &mut [u8]) -> usize {
        let n = self.pending().min(buf.len());
        buf[..n].copy_from_slice(&self.body[self.consumed..self.consumed + n]);
        self.advance(n);
        n
    }

    fn advance(&mut self, n: usize) {
        self.consumed += n;
        if self.consumed == self.body.len() {
            self.body.clear();
            self.consumed = 0;
        }
    }
}

/// Status code from an `HTTP/x y reason` line.
pub(crate) fn parse_status_line(line: &str) -> Option<u32> {
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

impl curl::easy::Handler for BodyHandler {
    fn header(&mut self, data: &[u8]) -> bool {
        if let Ok(s) = str::from_utf8(data) {
            // Every response in a redirect chain starts with a status line; the last one wins.
            if let Some(code) = parse_status_line(s.trim_end()) {
                self.status = Some(code);
            }
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        if self.status != Some(200) {
            self.rejected = true;
            return Ok(0);
        }
        self.body.extend_from_slice(data);
        Ok(data.len())
    }
}
