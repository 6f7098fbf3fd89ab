//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all gateway routes
//! - Wire up middleware (tracing, timeout, request ID, metrics)
//! - Guard the record routes behind the session check
//! - Run with graceful shutdown and the session sweeper

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::loader::ConfigError;
use crate::config::validation::ValidationError;
use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::session::{run_sweeper, SessionStore};
use crate::upstream::{UpstreamClient, UpstreamTarget};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub upstream: Arc<UpstreamClient>,
    pub config: Arc<GatewayConfig>,
}

/// HTTP server for the record gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    sessions: Arc<SessionStore>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails only when the upstream URLs do not parse, which a validated
    /// config rules out.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        let target = UpstreamTarget::from_config(&config.upstream).map_err(|_| {
            ConfigError::Validation(vec![ValidationError::InvalidUrl {
                field: "upstream.base_url",
                value: config.upstream.base_url.clone(),
            }])
        })?;

        let sessions = Arc::new(SessionStore::new(Duration::from_secs(
            config.session.ttl_secs,
        )));
        let state = AppState {
            sessions: sessions.clone(),
            upstream: Arc::new(UpstreamClient::new(target)),
            config: Arc::new(config.clone()),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            sessions,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        // Record routes sit behind the session guard; session/login/logout
        // handle authentication themselves.
        let records = Router::new()
            .route(
                "/api/clientes",
                get(handlers::list_records).post(handlers::create_record),
            )
            .route(
                "/api/clientes/{id}",
                put(handlers::update_record).delete(handlers::delete_record),
            )
            .route("/api/clientes/check", get(handlers::check_duplicate))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                handlers::require_session,
            ));

        Router::new()
            .route("/login", post(handlers::login))
            .route("/logout", get(handlers::logout))
            .route("/api/session", get(handlers::session_info))
            .merge(records)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(middleware::from_fn(track_metrics))
                    .layer(TraceLayer::new_for_http())
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sweep_interval = Duration::from_secs(self.config.session.sweep_interval_secs);
        tokio::spawn(run_sweeper(
            self.sessions.clone(),
            sweep_interval,
            shutdown.subscribe(),
        ));

        let mut stop = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Record method/status/latency for every completed request.
async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
