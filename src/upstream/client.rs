//! Forwarding client for the Backend Record Service.
//!
//! # Responsibilities
//! - Forward a method/path/JSON-body triple to the upstream
//! - Parse the upstream's JSON body, surfacing non-JSON as a typed error
//! - Apply the one-shot base correction and retry exactly once
//!
//! # Design Decisions
//! - Responses are relayed as (status, JSON) pairs; the gateway never
//!   re-interprets record payloads
//! - A 409 (or any other non-2xx with a JSON body) is a successful forward,
//!   not an error; only transport and parse failures enter the error path
//! - The correction retry targets the same logical request; a second
//!   failure propagates without further attempts

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde_json::Value;
use url::Url;

use crate::observability::metrics;
use crate::upstream::error::UpstreamError;
use crate::upstream::target::UpstreamTarget;

/// Cap on buffered upstream bodies. Record payloads are tiny; anything
/// bigger than this is not the service we think it is.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// A relayed upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub struct UpstreamClient {
    client: Client<HttpConnector, Body>,
    target: UpstreamTarget,
}

impl UpstreamClient {
    pub fn new(target: UpstreamTarget) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client, target }
    }

    /// The base URL currently in use (post-correction, if it happened).
    pub fn current_base(&self) -> Url {
        (*self.target.base()).clone()
    }

    /// Forward one call upstream, correcting the base address at most once.
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<&Value>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let base = self.target.base();
        let first = self
            .attempt(&base, method.clone(), path_and_query, body)
            .await;

        let err = match first {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        if !err.indicates_misconfigured_base() {
            return Err(err);
        }

        match self.target.correct(&base) {
            Some(corrected) => {
                tracing::warn!(
                    error = %err,
                    old_base = %base,
                    new_base = %corrected,
                    "Upstream base appears misconfigured, retrying once against fallback"
                );
                metrics::record_base_correction();
                self.attempt(&corrected, method, path_and_query, body).await
            }
            None => Err(err),
        }
    }

    async fn attempt(
        &self,
        base: &Url,
        method: Method,
        path_and_query: &str,
        body: Option<&Value>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let uri = join_url(base, path_and_query);

        let builder = Request::builder().method(method).uri(uri.as_str());
        let request = match body {
            Some(json) => {
                let bytes = serde_json::to_vec(json)
                    .map_err(|e| UpstreamError::InvalidRequest(e.to_string()))?;
                builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(bytes))
            }
            None => builder.body(Body::empty()),
        }
        .map_err(|e| UpstreamError::InvalidRequest(e.to_string()))?;

        tracing::debug!(uri = %uri, "Forwarding to upstream");

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| UpstreamError::from_client_error(&e))?;

        let status = response.status();
        let bytes = axum::body::to_bytes(Body::new(response.into_body()), MAX_BODY_BYTES)
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        match serde_json::from_slice(&bytes) {
            Ok(body) => Ok(UpstreamResponse { status, body }),
            Err(_) => {
                let preview = String::from_utf8_lossy(&bytes[..bytes.len().min(200)]);
                tracing::error!(
                    status = %status,
                    preview = %preview,
                    "Upstream returned non-JSON body"
                );
                Err(UpstreamError::InvalidJson)
            }
        }
    }
}

/// Join a base URL and a path-with-query the way the browser proxy did:
/// strip trailing slashes from the base, require a leading slash on the path.
fn join_url(base: &Url, path_and_query: &str) -> String {
    let base = base.as_str().trim_end_matches('/');
    if path_and_query.starts_with('/') {
        format!("{}{}", base, path_and_query)
    } else {
        format!("{}/{}", base, path_and_query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_strips_trailing_slashes() {
        let base = Url::parse("http://127.0.0.1:5000/api/").unwrap();
        assert_eq!(
            join_url(&base, "/clientes"),
            "http://127.0.0.1:5000/api/clientes"
        );
        assert_eq!(
            join_url(&base, "clientes/7"),
            "http://127.0.0.1:5000/api/clientes/7"
        );
    }

    #[test]
    fn join_url_preserves_query() {
        let base = Url::parse("http://127.0.0.1:5000/api").unwrap();
        assert_eq!(
            join_url(&base, "/clientes/check?dni_ruc=123&id=4"),
            "http://127.0.0.1:5000/api/clientes/check?dni_ruc=123&id=4"
        );
    }
}
