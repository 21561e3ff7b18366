//! Header sanitation for both directions of the proxied exchange.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers (request, response, every redirect hop)
//! - Strip sensitive auth/cookie/forwarding headers in both directions
//! - Never relay Set-Cookie to the caller
//!
//! # Design Decisions
//! - Allow-by-default, deny-by-exception: the tables below are the only
//!   exclusions; everything else passes through with duplicates preserved
//! - Transport-managed request headers (Host, Content-Length, Accept-Encoding)
//!   are recomputed by the client stack, so stale inbound values are dropped

use axum::http::header::HeaderName;
use axum::http::HeaderMap;

/// Protocol-level headers meaningful for a single hop only.
pub const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "proxy-connection",
    "keep-alive",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "proxy-authenticate",
    "proxy-authorization",
];

/// Auth, cookie, and forwarding headers never relayed in either direction.
pub const SENSITIVE: [&str; 11] = [
    "cookie",
    "authorization",
    "referer",
    "origin",
    "forwarded",
    "x-forwarded-for",
    "x-real-ip",
    "via",
    "x-proxy-id",
    "true-client-ip",
    "cf-connecting-ip",
];

/// Request headers owned by the outbound client: Host comes from the target
/// URL, Content-Length from the buffered body, Accept-Encoding from the
/// transport so decoded bodies reach the content rewriter.
const TRANSPORT_MANAGED: [&str; 3] = ["host", "content-length", "accept-encoding"];

fn in_table(name: &HeaderName, table: &[&str]) -> bool {
    table.iter().any(|t| name.as_str() == *t)
}

fn dropped_both_directions(name: &HeaderName) -> bool {
    in_table(name, &HOP_BY_HOP) || in_table(name, &SENSITIVE)
}

/// Sanitized copy of outbound request headers.
pub fn sanitize_request(src: &HeaderMap) -> HeaderMap {
    let mut dst = HeaderMap::with_capacity(src.len());
    for (name, value) in src.iter() {
        if dropped_both_directions(name) || in_table(name, &TRANSPORT_MANAGED) {
            continue;
        }
        dst.append(name.clone(), value.clone());
    }
    dst
}

/// Sanitized copy of inbound response headers. Set-Cookie is always removed,
/// regardless of any allow rule, to prevent session coupling between the
/// caller and the target.
pub fn sanitize_response(src: &HeaderMap) -> HeaderMap {
    let mut dst = HeaderMap::with_capacity(src.len());
    for (name, value) in src.iter() {
        if dropped_both_directions(name) || name.as_str() == "set-cookie" {
            continue;
        }
        dst.append(name.clone(), value.clone());
    }
    dst
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.append(
                HeaderName::from_static(k),
                HeaderValue::from_static(v),
            );
        }
        map
    }

    #[test]
    fn request_strips_hop_by_hop_and_sensitive() {
        let src = headers(&[
            ("connection", "keep-alive"),
            ("cookie", "session=abc"),
            ("authorization", "Bearer x"),
            ("x-forwarded-for", "1.2.3.4"),
            ("accept", "text/html"),
            ("user-agent", "test"),
        ]);
        let out = sanitize_request(&src);
        assert!(out.get("connection").is_none());
        assert!(out.get("cookie").is_none());
        assert!(out.get("authorization").is_none());
        assert!(out.get("x-forwarded-for").is_none());
        assert_eq!(out.get("accept").unwrap(), "text/html");
        assert_eq!(out.get("user-agent").unwrap(), "test");
    }

    #[test]
    fn request_strips_transport_managed() {
        let src = headers(&[
            ("host", "localhost:5000"),
            ("content-length", "42"),
            ("accept-encoding", "gzip"),
        ]);
        let out = sanitize_request(&src);
        assert!(out.is_empty());
    }

    #[test]
    fn response_never_contains_set_cookie() {
        let src = headers(&[
            ("set-cookie", "a=1"),
            ("set-cookie", "b=2"),
            ("content-type", "text/html"),
        ]);
        let out = sanitize_response(&src);
        assert!(out.get("set-cookie").is_none());
        assert_eq!(out.get("content-type").unwrap(), "text/html");
    }

    #[test]
    fn duplicates_of_allowed_headers_survive() {
        let src = headers(&[("x-custom", "one"), ("x-custom", "two")]);
        let out = sanitize_response(&src);
        let values: Vec<_> = out.get_all("x-custom").iter().collect();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn sanitize_is_idempotent() {
        let src = headers(&[
            ("connection", "close"),
            ("cookie", "x=y"),
            ("x-custom", "keep"),
            ("set-cookie", "a=1"),
        ]);
        let once_req = sanitize_request(&src);
        assert_eq!(once_req, sanitize_request(&once_req));
        let once_resp = sanitize_response(&src);
        assert_eq!(once_resp, sanitize_response(&once_resp));
    }
}
