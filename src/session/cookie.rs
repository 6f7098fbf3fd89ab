//! Session cookie encoding and parsing.
//!
//! The token is the only thing stored client-side; everything else lives in
//! the [`SessionStore`](crate::session::SessionStore). Attributes follow the
//! usual browser-session shape: HttpOnly, Path=/, Max-Age bounded to the
//! session TTL.

use std::time::Duration;

use axum::http::{header, HeaderMap};
use uuid::Uuid;

/// Extract the session token from a request's `Cookie` header, if present.
pub fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<Uuid> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(value) = value.to_str() else { continue };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            if parts.next() == Some(cookie_name) {
                if let Some(token) = parts.next() {
                    if let Ok(token) = Uuid::parse_str(token.trim()) {
                        return Some(token);
                    }
                }
            }
        }
    }
    None
}

/// Build a `Set-Cookie` value establishing a session.
pub fn session_cookie(cookie_name: &str, token: &Uuid, ttl: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        cookie_name,
        token,
        ttl.as_secs()
    )
}

/// Build a `Set-Cookie` value clearing the session cookie.
pub fn clearing_cookie(cookie_name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", cookie_name)
}
