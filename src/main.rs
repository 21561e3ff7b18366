//! Rust Production Forward Proxy
//!
//! A stateless forward proxy built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌────────────────────────────────────────────────┐
//!                        │                 FORWARD PROXY                   │
//!                        │                                                 │
//!   Client Request       │  ┌─────────┐   ┌──────────┐   ┌─────────────┐  │
//!   ────────────────────▶│  │  http   │──▶│ resolve  │──▶│  security   │  │
//!                        │  │ server  │   │path/ref. │   │ ssrf guard  │  │
//!                        │  └─────────┘   └──────────┘   └──────┬──────┘  │
//!                        │                                      │         │
//!                        │                                      ▼         │
//!                        │                              ┌─────────────┐   │
//!                        │                              │  upstream   │   │
//!                        │                              │ spec+client │───┼──▶ Target
//!                        │                              └──────┬──────┘   │    (direct /
//!                        │                                      │         │     HTTP proxy /
//!   Client Response      │  ┌─────────┐   ┌──────────┐   ┌─────▼──────┐  │     SOCKS5)
//!   ◀────────────────────┼──│response │◀──│ rewrite  │◀──│  security  │  │
//!                        │  │  emit   │   │ content  │   │  headers   │  │
//!                        │  └─────────┘   └──────────┘   └────────────┘  │
//!                        │                                                 │
//!                        │  Cross-cutting: config · observability · errors │
//!                        └────────────────────────────────────────────────┘
//! ```

// Core pipeline
pub mod error;
pub mod resolve;
pub mod rewrite;
pub mod security;
pub mod upstream;

// Surface and cross-cutting concerns
pub mod config;
pub mod http;
pub mod observability;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::http::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forward_proxy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("forward-proxy v0.1.0 starting");

    // Load configuration (CONFIG_PATH file if set, BIND_ADDR override)
    let config = config::loader::from_env()?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_redirects = config.forwarding.max_redirects,
        rewrite_enabled = config.rewrite.enabled,
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "Listening for connections");

    // Initialize metrics server
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            crate::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Create and run HTTP server
    let server = HttpServer::new(config);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
