//! Response assembly and transformation.
//!
//! # Responsibilities
//! - Emit the informational usage body for `GET /`
//! - Turn an upstream response into the caller's response: original status,
//!   sanitized headers, body rewritten or streamed
//!
//! # Design Decisions
//! - Streaming is the default; only rewritable content types are buffered,
//!   and only below the configured cap
//! - A stale Content-Length is dropped whenever the body is re-materialized

use axum::body::Body;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::error::{ProxyError, ProxyResult};
use crate::rewrite::content::{is_rewritable, RewriteContext};
use crate::security::headers::sanitize_response;

/// Informational body for `GET /`.
pub fn usage_response() -> Response {
    Json(json!({
        "message": "Stateless forward proxy (sanitized headers, SSRF guarded, content rewriting)",
        "usage": [
            "/https://example.com/path",
            "/http://example.com/path",
            "/<proxySpec>/https://example.com/path",
        ],
    }))
    .into_response()
}

/// Build the caller-facing response from an upstream one.
///
/// When a rewrite context is supplied and the content type qualifies, the
/// body is buffered and rewritten; otherwise it streams through untouched.
pub async fn forward_response(
    upstream: reqwest::Response,
    rewrite: Option<&RewriteContext>,
    max_rewrite_bytes: usize,
) -> ProxyResult<Response> {
    let status = upstream.status();
    let mut headers = sanitize_response(upstream.headers());

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let within_cap = upstream
        .content_length()
        .map_or(true, |len| len as usize <= max_rewrite_bytes);

    let body = match rewrite {
        Some(ctx) if is_rewritable(&content_type) && within_cap && has_body(status) => {
            let text = upstream.text().await.map_err(ProxyError::ResponseReadFailed)?;
            // Length changed under rewriting.
            headers.remove(CONTENT_LENGTH);
            Body::from(ctx.rewrite(&text))
        }
        _ => Body::from_stream(upstream.bytes_stream()),
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

fn has_body(status: StatusCode) -> bool {
    !(status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bodyless_statuses() {
        assert!(!has_body(StatusCode::NO_CONTENT));
        assert!(!has_body(StatusCode::NOT_MODIFIED));
        assert!(!has_body(StatusCode::CONTINUE));
        assert!(has_body(StatusCode::OK));
        assert!(has_body(StatusCode::NOT_FOUND));
    }
}
