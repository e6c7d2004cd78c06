//! One in-flight transfer on the client's multi handle, readable as a stream.

use std::io::{self, Read};
use std::time::Duration;

use curl::easy::Easy2;
use curl::multi::{Easy2Handle, Multi};

use super::handler::BodyHandler;
use super::ProbeError;

const WAIT_MS: u64 = 100;

/// Drives a single easy handle on `multi` until its buffered bytes are
/// consumed. Returns the easy handle to `slot` when finished or dropped so
/// the next probe reuses its connection.
pub(crate) struct Transfer<'a> {
    multi: &'a Multi,
    slot: &'a mut Option<Easy2<BodyHandler>>,
    handle: Option<Easy2Handle<BodyHandler>>,
    done: Option<Result<(), curl::Error>>,
}

impl<'a> Transfer<'a> {
    pub(crate) fn new(
        multi: &'a Multi,
        slot: &'a mut Option<Easy2<BodyHandler>>,
        handle: Easy2Handle<BodyHandler>,
    ) -> Self {
        Self {
            multi,
            slot,
            handle: Some(handle),
            done: None,
        }
    }

    pub(crate) fn handler(&self) -> &BodyHandler {
        static IDLE: BodyHandler = BodyHandler::idle();
        self.handle.as_ref().map(|h| h.get_ref()).unwrap_or(&IDLE)
    }

    pub(crate) fn is_done(&self) -> bool {
        self.done.is_some() || self.handle.is_none()
    }

    pub(crate) fn take_prefix(&mut self, max: usize) -> Vec<u8> {
        match self.handle.as_mut() {
            Some(h) => h.get_mut().take_prefix(max),
            None => Vec::new(),
        }
    }

    /// One perform/messages/wait round.
    pub(crate) fn step(&mut self) -> Result<(), ProbeError> {
        let Some(handle) = self.handle.as_ref() else {
            return Ok(());
        };
        let running = self.multi.perform()?;
        let mut done = None;
        self.multi.messages(|msg| {
            if let Some(res) = msg.result_for2(handle) {
                done = Some(res);
            }
        });
        if done.is_some() {
            self.done = done;
        } else if running > 0 {
            self.multi.wait(&mut [], Duration::from_millis(WAIT_MS))?;
        }
        Ok(())
    }

    /// Detaches the handle and returns the final response code.
    /// A transfer error is reported unless the body was refused on purpose.
    pub(crate) fn finish(&mut self) -> Result<u32, ProbeError> {
        let Some(handle) = self.handle.take() else {
            return Ok(0);
        };
        let rejected = handle.get_ref().rejected();
        let easy = self.multi.remove2(handle)?;
        let code = easy.response_code().unwrap_or(0);
        *self.slot = Some(easy);
        match self.done.take() {
            Some(Err(e)) if !rejected => Err(ProbeError::Transfer(e)),
            _ => Ok(code),
        }
    }
}

impl Read for Transfer<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let Some(handle) = self.handle.as_mut() else {
                return Ok(0);
            };
            let n = handle.get_mut().drain_into(buf);
            if n > 0 {
                return Ok(n);
            }
            if self.done.is_some() {
                self.finish().map_err(io::Error::other)?;
                return Ok(0);
            }
            self.step().map_err(io::Error::other)?;
        }
    }
}

impl Drop for Transfer<'_> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Ok(easy) = self.multi.remove2(handle) {
                *self.slot = Some(easy);
            }
        }
    }
}
