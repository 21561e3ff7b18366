//! Per-request client construction and the forwarding loop.
//!
//! # Responsibilities
//! - Build a client bound to one optional ProxySpec (direct / HTTP / SOCKS5)
//! - Pin direct dials to the SSRF-validated address set
//! - Issue the outbound call, following redirects within the hop budget
//! - Re-apply header sanitation and SSRF validation on every hop
//!
//! # Design Decisions
//! - The client's own redirect policy is disabled; the loop below owns the
//!   budget so each hop can be sanitized and re-validated
//! - On hop 11 the last response is returned as-is, never an error
//! - 301/302/303 downgrade to GET without body; 307/308 preserve both

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::header::LOCATION;
use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;
use url::Url;

use crate::config::ProxyConfig;
use crate::error::{ProxyError, ProxyResult};
use crate::security::{headers, ssrf};
use crate::upstream::spec::ProxySpec;

/// A transport bound to one ProxySpec (or none), with fixed timeouts and an
/// explicit redirect budget. Scoped to a single request; never pooled across
/// requests.
pub struct ResolvedClient {
    client: reqwest::Client,
    max_redirects: u32,
    guard_redirects: bool,
}

impl ResolvedClient {
    /// Build a client for one request.
    ///
    /// `pin` carries the hostname and SSRF-validated addresses for a direct
    /// dial; proxied dials pass `None` because the upstream proxy performs
    /// its own resolution (for SOCKS5 that is the point of `socks5h`).
    pub fn build(
        spec: Option<&ProxySpec>,
        pin: Option<(&str, &[SocketAddr])>,
        config: &ProxyConfig,
    ) -> ProxyResult<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .pool_idle_timeout(Duration::from_secs(config.timeouts.idle_secs))
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .redirect(reqwest::redirect::Policy::none());

        if let Some(spec) = spec {
            let proxy = reqwest::Proxy::all(spec.proxy_url()?)
                .map_err(|_| ProxyError::InvalidProxySpec(spec.host.clone()))?;
            builder = builder.proxy(proxy);
        } else {
            // Direct means direct: ambient proxy environment does not apply,
            // and the dial goes to the addresses the guard validated.
            builder = builder.no_proxy();
            if let Some((host, addrs)) = pin {
                builder = builder.resolve_to_addrs(host, addrs);
            }
        }

        let client = builder.build().map_err(ProxyError::UpstreamRequestFailed)?;
        Ok(Self {
            client,
            max_redirects: config.forwarding.max_redirects,
            guard_redirects: config.security.block_private_addresses,
        })
    }

    /// Execute the outbound call. Headers are sanitized immediately before
    /// every hop, including the first.
    pub async fn forward(
        &self,
        method: Method,
        url: Url,
        inbound_headers: &HeaderMap,
        body: Bytes,
    ) -> ProxyResult<reqwest::Response> {
        let mut url = url;
        let mut method = method;
        let mut body = Some(body);
        let mut follows = 0u32;

        loop {
            let outbound = headers::sanitize_request(inbound_headers);
            let mut request = self.client.request(method.clone(), url.clone()).headers(outbound);
            if let Some(bytes) = &body {
                if !bytes.is_empty() {
                    request = request.body(bytes.clone());
                }
            }

            let response = request
                .send()
                .await
                .map_err(ProxyError::UpstreamRequestFailed)?;

            let status = response.status();
            if !status.is_redirection() || follows >= self.max_redirects {
                return Ok(response);
            }

            // Missing or unparsable Location: hand the response back as-is.
            let next = match response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|loc| join_location(&url, loc))
            {
                Some(next) => next,
                None => return Ok(response),
            };

            if self.guard_redirects {
                ssrf::validate_target(&next).await?;
            }

            if downgrades_to_get(status, &method) {
                method = Method::GET;
                body = None;
            }

            tracing::debug!(from = %url, to = %next, hop = follows + 1, "Following redirect");
            url = next;
            follows += 1;
        }
    }
}

/// Resolve a Location header value against the current URL.
fn join_location(current: &Url, location: &str) -> Option<Url> {
    let next = current.join(location).ok()?;
    match next.scheme() {
        "http" | "https" => Some(next),
        _ => None,
    }
}

/// 301/302/303 responses to non-GET/HEAD requests are re-issued as GET
/// without a body, matching browser behavior; 307/308 preserve the method.
fn downgrades_to_get(status: StatusCode, method: &Method) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER
    ) && *method != Method::GET
        && *method != Method::HEAD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_joins_relative_and_absolute() {
        let base = Url::parse("https://example.com/a/b").unwrap();
        assert_eq!(
            join_location(&base, "/login").unwrap().as_str(),
            "https://example.com/login"
        );
        assert_eq!(
            join_location(&base, "next").unwrap().as_str(),
            "https://example.com/a/next"
        );
        assert_eq!(
            join_location(&base, "https://other.example.com/").unwrap().as_str(),
            "https://other.example.com/"
        );
    }

    #[test]
    fn location_with_foreign_scheme_ignored() {
        let base = Url::parse("https://example.com/").unwrap();
        assert!(join_location(&base, "ftp://example.com/file").is_none());
        assert!(join_location(&base, "javascript:alert(1)").is_none());
    }

    #[test]
    fn post_downgrades_on_302_but_not_307() {
        assert!(downgrades_to_get(StatusCode::FOUND, &Method::POST));
        assert!(downgrades_to_get(StatusCode::SEE_OTHER, &Method::PUT));
        assert!(!downgrades_to_get(StatusCode::TEMPORARY_REDIRECT, &Method::POST));
        assert!(!downgrades_to_get(StatusCode::PERMANENT_REDIRECT, &Method::POST));
        assert!(!downgrades_to_get(StatusCode::FOUND, &Method::GET));
    }
}
