//! Process-wide session storage.
//!
//! # Responsibilities
//! - Map opaque tokens to authenticated user identities
//! - Enforce the bounded session lifetime
//! - Sweep expired entries in the background
//!
//! # Design Decisions
//! - Tokens are random UUIDs; nothing is derived from user data
//! - The user identity is stored as the JSON the upstream returned,
//!   never re-interpreted by the gateway
//! - Lookup is lazy about expiry: an expired entry is removed on read,
//!   the sweeper only bounds memory between reads

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

/// A single authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Identity fields exactly as returned by the upstream login.
    pub user: Value,
    /// Absolute expiry deadline.
    pub expires_at: Instant,
}

/// Concurrent token → session map with a fixed TTL.
pub struct SessionStore {
    sessions: DashMap<Uuid, Session>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Establish a new session for `user`, returning its token.
    pub fn create(&self, user: Value) -> Uuid {
        let token = Uuid::new_v4();
        self.sessions.insert(
            token,
            Session {
                user,
                expires_at: Instant::now() + self.ttl,
            },
        );
        token
    }

    /// Look up the identity bound to `token`, removing it if expired.
    pub fn user_for(&self, token: &Uuid) -> Option<Value> {
        let expired = match self.sessions.get(token) {
            Some(session) if session.expires_at > Instant::now() => {
                return Some(session.user.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.sessions.remove(token);
        }
        None
    }

    /// Destroy a session. Succeeds whether or not the token exists.
    pub fn destroy(&self, token: &Uuid) {
        self.sessions.remove(token);
    }

    /// Remove every expired session, returning how many were dropped.
    ///
    /// Logins may land concurrently with a sweep, so removals are counted
    /// inside the retain pass rather than derived from before/after sizes.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut dropped = 0;
        self.sessions.retain(|_, session| {
            let keep = session.expires_at > now;
            if !keep {
                dropped += 1;
            }
            keep
        });
        dropped
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Periodically sweep expired sessions until shutdown.
pub async fn run_sweeper(
    store: Arc<SessionStore>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let dropped = store.sweep_expired();
                if dropped > 0 {
                    tracing::debug!(dropped, remaining = store.len(), "Swept expired sessions");
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("Session sweeper received shutdown signal, exiting loop");
                return;
            }
        }
    }
}
