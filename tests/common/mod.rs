//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use forward_proxy::config::ProxyConfig;
use forward_proxy::http::HttpServer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start the proxy on an ephemeral port and return its address.
pub async fn spawn_proxy(config: ProxyConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config);
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    addr
}

/// A proxy config whose SSRF guard admits loopback, for tests whose
/// upstreams necessarily live on 127.0.0.1.
pub fn local_config() -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.security.block_private_addresses = false;
    config
}

/// Start a mock upstream that answers every request with the given raw HTTP
/// response. Returns its address.
pub async fn start_raw_backend(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a mock upstream that always redirects to `/loop` and counts the
/// requests it receives.
pub async fn start_redirecting_backend(hits: Arc<AtomicU32>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let hits = hits.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        hits.fetch_add(1, Ordering::SeqCst);
                        let response = "HTTP/1.1 302 Found\r\n\
                             Location: /loop\r\n\
                             Content-Length: 0\r\n\
                             Connection: close\r\n\r\n";
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Client that talks straight to the proxy under test, ignoring any ambient
/// proxy environment.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}
