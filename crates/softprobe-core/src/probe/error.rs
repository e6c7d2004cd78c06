//! Probe failures. All of them are recoverable: the resolver logs the error
//! and moves on to the next candidate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// Building or configuring the request failed (bad URL, option error).
    #[error("request setup: {0}")]
    Setup(#[source] curl::Error),
    /// The curl multi handle itself failed.
    #[error("curl multi: {0}")]
    Multi(#[from] curl::MultiError),
    /// DNS, connect, TLS, timeout or read failure during the transfer.
    #[error("transfer: {0}")]
    Transfer(#[source] curl::Error),
}

impl ProbeError {
    /// True for connect/stall/overall timeouts.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProbeError::Transfer(e) if e.is_operation_timedout())
    }

    /// True for DNS and connection-level failures.
    pub fn is_connection(&self) -> bool {
        match self {
            ProbeError::Transfer(e) => {
                e.is_couldnt_connect()
                    || e.is_couldnt_resolve_host()
                    || e.is_couldnt_resolve_proxy()
                    || e.is_recv_error()
                    || e.is_send_error()
                    || e.is_got_nothing()
            }
            _ => false,
        }
    }
}
