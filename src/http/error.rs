//! Gateway error envelopes.
//!
//! Every failure a handler can surface maps to a fixed status and a stable
//! `{ok:false, error:...}` JSON body. Upstream internals never leak to the
//! browser.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::upstream::UpstreamError;

/// Errors the gateway reports to the browser on its own behalf.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No valid session attached to the request.
    #[error("not authenticated")]
    AuthenticationRequired,

    /// Upstream could not be reached.
    #[error("backend unavailable")]
    BackendUnavailable,

    /// Upstream could not be reached and the base address is suspect.
    /// Login surfaces this variant so operators see the likely cause.
    #[error("backend unavailable or misconfigured base address")]
    BackendMisconfigured,

    /// Upstream answered HTTP, but the body was not JSON.
    #[error("backend returned an invalid response")]
    BackendInvalidResponse,
}

impl GatewayError {
    /// Mapping used by the record passthrough routes.
    pub fn from_record_failure(err: UpstreamError) -> Self {
        match err {
            UpstreamError::InvalidJson => GatewayError::BackendMisconfigured,
            _ => GatewayError::BackendUnavailable,
        }
    }

    /// Mapping used by the login route, which distinguishes a non-JSON
    /// answer from an unreachable backend.
    pub fn from_login_failure(err: UpstreamError) -> Self {
        match err {
            UpstreamError::InvalidJson => GatewayError::BackendInvalidResponse,
            _ => GatewayError::BackendMisconfigured,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            GatewayError::AuthenticationRequired => {
                (StatusCode::UNAUTHORIZED, "Not authenticated")
            }
            GatewayError::BackendUnavailable => (StatusCode::BAD_GATEWAY, "Backend unavailable"),
            GatewayError::BackendMisconfigured => (
                StatusCode::BAD_GATEWAY,
                "Backend unavailable or misconfigured API_BASE",
            ),
            GatewayError::BackendInvalidResponse => (
                StatusCode::BAD_GATEWAY,
                "Backend returned invalid response. Check backend server.",
            ),
        };
        (status, Json(json!({ "ok": false, "error": message }))).into_response()
    }
}
