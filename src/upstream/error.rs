//! Upstream failure classification.

use thiserror::Error;

/// Errors that can occur while talking to the Backend Record Service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// TCP connect failed (refused, unreachable, reset during connect).
    #[error("could not connect to upstream: {0}")]
    Connect(String),

    /// The peer answered, but not with parseable HTTP. Typical of a
    /// non-HTTP service (e.g. a database) listening on the configured port.
    #[error("upstream returned a malformed HTTP response: {0}")]
    MalformedResponse(String),

    /// Any other transport-level failure (reset mid-stream, timeout, ...).
    #[error("upstream transport error: {0}")]
    Transport(String),

    /// Upstream answered valid HTTP but the body was not JSON.
    #[error("upstream returned a non-JSON body")]
    InvalidJson,

    /// The forwarded request could not be constructed.
    #[error("invalid upstream request: {0}")]
    InvalidRequest(String),
}

impl UpstreamError {
    /// Whether this failure signature is consistent with a misconfigured
    /// base address, making the one-shot correction worth attempting.
    pub fn indicates_misconfigured_base(&self) -> bool {
        matches!(
            self,
            UpstreamError::Connect(_)
                | UpstreamError::MalformedResponse(_)
                | UpstreamError::InvalidJson
        )
    }

    /// Classify a client-side forwarding error.
    pub fn from_client_error(err: &hyper_util::client::legacy::Error) -> Self {
        if err.is_connect() {
            return UpstreamError::Connect(err.to_string());
        }

        let mut source = std::error::Error::source(err);
        while let Some(inner) = source {
            if let Some(hyper_err) = inner.downcast_ref::<hyper::Error>() {
                if hyper_err.is_parse() || hyper_err.is_incomplete_message() {
                    return UpstreamError::MalformedResponse(hyper_err.to_string());
                }
            }
            source = inner.source();
        }

        UpstreamError::Transport(err.to_string())
    }
}
