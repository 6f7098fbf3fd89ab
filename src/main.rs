//! Record Gateway
//!
//! A session-authenticated reverse proxy in front of the Backend Record
//! Service, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────┐
//!                    │                 RECORD GATEWAY                  │
//!                    │                                                 │
//!   Browser request  │  ┌─────────┐   ┌──────────┐   ┌─────────────┐  │
//!   ─────────────────┼─▶│  http   │──▶│ session  │──▶│  upstream   │──┼──▶ Backend
//!                    │  │ server  │   │  guard   │   │  forwarder  │  │    Record
//!                    │  └─────────┘   └──────────┘   └──────┬──────┘  │    Service
//!                    │                                      │         │
//!                    │                       one-shot base  │         │
//!                    │                       correction ◀───┘         │
//!                    │                                                 │
//!                    │  ┌──────────────────────────────────────────┐  │
//!                    │  │           Cross-Cutting Concerns          │  │
//!                    │  │  ┌────────┐ ┌─────────────┐ ┌──────────┐ │  │
//!                    │  │  │ config │ │observability│ │lifecycle │ │  │
//!                    │  │  └────────┘ └─────────────┘ └──────────┘ │  │
//!                    │  └──────────────────────────────────────────┘  │
//!                    └────────────────────────────────────────────────┘
//! ```

use std::path::Path;

use tokio::net::TcpListener;

use records_gateway::config::loader::{apply_env_overrides, load_config};
use records_gateway::config::GatewayConfig;
use records_gateway::observability::{logging, metrics};
use records_gateway::{HttpServer, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    tracing::info!("records-gateway v0.1.0 starting");

    // Optional config file path as the first argument.
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => GatewayConfig::default(),
    };
    let config = apply_env_overrides(config)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_base = %config.upstream.base_url,
        upstream_fallback = %config.upstream.fallback_url,
        session_ttl_secs = config.session.ttl_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            trigger.trigger();
        }
    });

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
