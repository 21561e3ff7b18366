//! Pipeline error definitions.
//!
//! # Responsibilities
//! - One error kind per failure class in the request pipeline
//! - Map each kind to the HTTP status surfaced to the caller
//! - Render failures as the `{"message": "..."}` JSON body
//!
//! # Design Decisions
//! - Validation failures (URL, spec, SSRF) are 400 with a reason naming the
//!   blocked condition or the accepted formats
//! - Transport failures carry the underlying client error message, nothing else

use std::net::IpAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

/// Errors that can occur while resolving and forwarding a request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The path did not yield a parseable absolute target URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The proxy specification string matched none of the accepted shapes.
    #[error("invalid proxy spec '{0}'; accepted formats: host:port, user:pass@host:port, \
             host:port@user:pass, host:user:pass:port, user:pass:host:port, \
             socks5://[user:pass@]host:port")]
    InvalidProxySpec(String),

    /// Target scheme outside http/https.
    #[error("blocked scheme: {0} (only http/https allowed)")]
    BlockedScheme(String),

    /// Target host is a reserved local name.
    #[error("blocked host: {0}")]
    BlockedHost(String),

    /// Target address falls in a private/loopback/link-local range.
    #[error("blocked private/local address: {0}")]
    BlockedAddress(IpAddr),

    /// DNS lookup of the target hostname failed.
    #[error("dns lookup failed for {host}: {source}")]
    DnsResolutionFailed {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// DNS lookup succeeded but returned no addresses.
    #[error("no address for host: {0}")]
    NoAddress(String),

    /// Inbound request body exceeded the configured buffer cap.
    #[error("request body exceeds {0} bytes")]
    RequestBodyTooLarge(usize),

    /// The outbound call failed at the transport layer.
    #[error("upstream request failed: {0}")]
    UpstreamRequestFailed(#[source] reqwest::Error),

    /// The upstream response body could not be read.
    #[error("failed to read upstream response: {0}")]
    ResponseReadFailed(#[source] reqwest::Error),
}

impl ProxyError {
    /// HTTP status surfaced to the caller for this error kind.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidUrl(_)
            | ProxyError::InvalidProxySpec(_)
            | ProxyError::BlockedScheme(_)
            | ProxyError::BlockedHost(_)
            | ProxyError::BlockedAddress(_)
            | ProxyError::DnsResolutionFailed { .. }
            | ProxyError::NoAddress(_) => StatusCode::BAD_REQUEST,
            ProxyError::RequestBodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::UpstreamRequestFailed(_) => StatusCode::BAD_GATEWAY,
            ProxyError::ResponseReadFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

/// Result type for pipeline operations.
pub type ProxyResult<T> = Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_400() {
        assert_eq!(
            ProxyError::InvalidUrl("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProxyError::BlockedScheme("ftp".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProxyError::BlockedAddress("10.0.0.1".parse().unwrap()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn spec_error_names_accepted_formats() {
        let err = ProxyError::InvalidProxySpec("???".into());
        let msg = err.to_string();
        assert!(msg.contains("host:port"));
        assert!(msg.contains("socks5://"));
    }

    #[test]
    fn body_cap_maps_to_413() {
        assert_eq!(
            ProxyError::RequestBodyTooLarge(1024).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }
}
