//! Gateway route handlers.
//!
//! # Responsibilities
//! - Login: forward credentials upstream, establish the session cookie
//! - Logout: destroy the session unconditionally
//! - Session info: report the authenticated identity
//! - Record passthrough: relay /api/clientes calls and their status codes
//!
//! # Design Decisions
//! - Upstream status and JSON body are relayed unchanged on every
//!   successful forward, 409 conflicts included
//! - Browser form posts (no JSON accept) get redirects; AJAX gets JSON
//! - The auth guard runs before any upstream call is made

use axum::body::Body;
use axum::extract::{FromRequest, Path, RawQuery, Request, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::error::GatewayError;
use crate::http::server::AppState;
use crate::session::cookie;
use crate::upstream::UpstreamResponse;

/// Credentials as submitted by the login form or an AJAX call.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub usuario: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Does the caller want JSON back, or is this a plain browser form post?
fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}

fn is_json_body(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

/// POST /login — forward credentials, establish a session on success.
pub async fn login(State(state): State<AppState>, request: Request) -> Response {
    let accepts_json = wants_json(request.headers());
    let json_body = is_json_body(request.headers());

    let credentials: LoginRequest = if json_body {
        match Json::<LoginRequest>::from_request(request, &()).await {
            Ok(Json(c)) => c,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "ok": false, "error": "Malformed login body" })),
                )
                    .into_response()
            }
        }
    } else {
        match Form::<LoginRequest>::from_request(request, &()).await {
            Ok(Form(c)) => c,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "ok": false, "error": "Malformed login body" })),
                )
                    .into_response()
            }
        }
    };

    let usuario = credentials.usuario.or(credentials.username);
    let payload = json!({
        "usuario": usuario,
        "password": credentials.password,
    });

    let response = match state
        .upstream
        .forward(Method::POST, "/login", Some(&payload))
        .await
    {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(error = %err, "Login forward failed");
            return GatewayError::from_login_failure(err).into_response();
        }
    };

    let ok = response
        .body
        .get("ok")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !ok {
        // Upstream rejected the credentials: relay its verdict unchanged.
        return (response.status, Json(response.body)).into_response();
    }

    let user = response.body.get("user").cloned().unwrap_or(Value::Null);
    let token = state.sessions.create(user);
    let set_cookie = cookie::session_cookie(
        &state.config.session.cookie_name,
        &token,
        std::time::Duration::from_secs(state.config.session.ttl_secs),
    );

    tracing::info!("Login succeeded, session established");

    let headers = [(header::SET_COOKIE, set_cookie)];
    if accepts_json {
        (headers, Json(json!({ "ok": true }))).into_response()
    } else {
        (headers, Redirect::to("/clientes.html")).into_response()
    }
}

/// GET /logout — destroy the session whether or not one exists.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = cookie::token_from_headers(&headers, &state.config.session.cookie_name) {
        state.sessions.destroy(&token);
    }

    let clear = [(
        header::SET_COOKIE,
        cookie::clearing_cookie(&state.config.session.cookie_name),
    )];
    if wants_json(&headers) {
        (clear, Json(json!({ "ok": true }))).into_response()
    } else {
        (clear, Redirect::to("/login.html")).into_response()
    }
}

/// GET /api/session — identity of the current session, or 401.
pub async fn session_info(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match authenticated_user(&state, &headers) {
        Some(user) => Json(json!({ "ok": true, "user": user })).into_response(),
        None => GatewayError::AuthenticationRequired.into_response(),
    }
}

/// Guard layer for the record routes: reject before anything is forwarded.
pub async fn require_session(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if authenticated_user(&state, request.headers()).is_none() {
        return GatewayError::AuthenticationRequired.into_response();
    }
    next.run(request).await
}

fn authenticated_user(state: &AppState, headers: &HeaderMap) -> Option<Value> {
    let token = cookie::token_from_headers(headers, &state.config.session.cookie_name)?;
    state.sessions.user_for(&token)
}

/// GET /api/clientes
pub async fn list_records(State(state): State<AppState>) -> Response {
    relay(state.upstream.forward(Method::GET, "/clientes", None).await)
}

/// POST /api/clientes
pub async fn create_record(State(state): State<AppState>, Json(payload): Json<Value>) -> Response {
    relay(
        state
            .upstream
            .forward(Method::POST, "/clientes", Some(&payload))
            .await,
    )
}

/// PUT /api/clientes/{id}
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> Response {
    relay(
        state
            .upstream
            .forward(Method::PUT, &format!("/clientes/{}", id), Some(&payload))
            .await,
    )
}

/// DELETE /api/clientes/{id}
pub async fn delete_record(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    relay(
        state
            .upstream
            .forward(Method::DELETE, &format!("/clientes/{}", id), None)
            .await,
    )
}

/// GET /api/clientes/check?dni_ruc=&id= — duplicate-key pre-check.
pub async fn check_duplicate(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Response {
    let path = match query {
        Some(query) => format!("/clientes/check?{}", query),
        None => "/clientes/check".to_string(),
    };
    relay(state.upstream.forward(Method::GET, &path, None).await)
}

/// Relay an upstream result: status and body unchanged on success, the
/// fixed 502 envelope on transport or parse failure.
fn relay(result: Result<UpstreamResponse, crate::upstream::UpstreamError>) -> Response {
    match result {
        Ok(response) => (response.status, Json(response.body)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Record forward failed");
            GatewayError::from_record_failure(err).into_response()
        }
    }
}
