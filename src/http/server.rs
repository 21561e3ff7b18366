//! HTTP server setup and the proxy pipeline handler.
//!
//! # Responsibilities
//! - Create the Axum router: `/` and `/{*path}`, every method, one handler
//! - Wire up middleware (timeout, request ID, tracing)
//! - Drive the pipeline: resolve → guard → disambiguate → forward →
//!   sanitize → rewrite → emit
//!
//! # Design Decisions
//! - The handler owns no state beyond the shared immutable config; every
//!   request is independent
//! - Validation failures surface as 400 JSON bodies, transport failures as
//!   502, before any response bytes are committed

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::header::REFERER;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::error::{ProxyError, ProxyResult};
use crate::http::request::{own_authority, RequestId, RequestIdLayer};
use crate::http::response::{forward_response, usage_response};
use crate::observability::metrics;
use crate::resolve::resolve_target;
use crate::rewrite::RewriteContext;
use crate::security::ssrf;
use crate::upstream::client::ResolvedClient;
use crate::upstream::ProxySpec;

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
}

/// HTTP server for the forward proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let state = AppState {
            config: Arc::new(config.clone()),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler: every method, every path.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let method = request.method().to_string();

    if request.uri().path() == "/" {
        return usage_response();
    }

    match handle_proxy(&state, &request_id, request).await {
        Ok((upstream_host, response)) => {
            metrics::record_request(&method, response.status().as_u16(), &upstream_host, start);
            response
        }
        Err(err) => {
            tracing::warn!(request_id = %request_id, error = %err, "Request failed");
            let response = err.into_response();
            metrics::record_request(&method, response.status().as_u16(), "none", start);
            response
        }
    }
}

/// The request pipeline, start to finish, for one inbound request.
async fn handle_proxy(
    state: &AppState,
    request_id: &str,
    request: Request<Body>,
) -> ProxyResult<(String, Response)> {
    let config = &state.config;

    let authority = own_authority(&request);
    let referer = request
        .headers()
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);
    let method = request.method().clone();

    // 1. Resolve the target: direct URL, spec+URL, or Referer reconstruction.
    let resolved = resolve_target(&path, referer.as_deref(), authority.as_deref())?;
    let mut url = resolved.url;
    if let Some(q) = &query {
        url.set_query(Some(q));
    }

    tracing::debug!(
        request_id = %request_id,
        target = %url,
        proxy_spec = resolved.proxy_spec.as_deref().unwrap_or("-"),
        "Proxying request"
    );

    // 2. SSRF guard on every resolved target, Referer-derived ones included.
    let validated_addrs = if config.security.block_private_addresses {
        Some(ssrf::validate_target(&url).await?)
    } else {
        None
    };

    // 3. Disambiguate the upstream proxy spec, if one was given.
    let spec = resolved
        .proxy_spec
        .as_deref()
        .map(ProxySpec::parse)
        .transpose()?;

    // 4. Buffer the inbound body; redirect hops may need to re-send it.
    let inbound_headers = request.headers().clone();
    let body = axum::body::to_bytes(request.into_body(), config.security.max_body_size)
        .await
        .map_err(|_| ProxyError::RequestBodyTooLarge(config.security.max_body_size))?;

    // 5. Transport bound to this spec; direct dials pin the validated
    //    addresses so the connection uses exactly what the guard checked.
    let pin = match (&spec, &validated_addrs, url.host_str()) {
        (None, Some(addrs), Some(host)) => Some((host, addrs.as_slice())),
        _ => None,
    };
    let client = ResolvedClient::build(spec.as_ref(), pin, config)?;

    // 6. Forward; headers are re-sanitized before every hop.
    let upstream = client.forward(method, url.clone(), &inbound_headers, body).await?;
    let upstream_host = url.host_str().unwrap_or("none").to_string();

    // 7. Rewrite eligible bodies against the final document URL.
    let rewrite_ctx = if config.rewrite.enabled {
        config
            .rewrite
            .public_base
            .clone()
            .or_else(|| authority.map(|a| format!("http://{a}")))
            .map(|proxy_base| RewriteContext::new(upstream.url().clone(), proxy_base))
    } else {
        None
    };

    let response =
        forward_response(upstream, rewrite_ctx.as_ref(), config.rewrite.max_buffer_bytes).await?;
    Ok((upstream_host, response))
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
