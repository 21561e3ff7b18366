//! Path parsing: extract the target URL and optional proxy spec.
//!
//! Accepted shapes:
//! ```text
//! /https://example.com/path
//! /http://example.com/path
//! /<proxySpec>/https://example.com/path
//! /<proxySpec>/http://example.com/path
//! ```
//! Anything else is handed to the Referer fallback in `referer.rs`.

use url::Url;

use crate::error::{ProxyError, ProxyResult};
use crate::resolve::referer;

/// Output of the Path Resolver: where to go, and optionally through what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Absolute target URL (scheme + host guaranteed non-empty).
    pub url: Url,
    /// Raw proxy specification, if the path carried one.
    pub proxy_spec: Option<String>,
}

/// Split a request path into (target URL string, optional proxy spec).
///
/// The first `/http://` or `/https://` occurrence separates the spec from the
/// target. A match at position 0 means an empty spec, which is not a
/// distinguishable case and is rejected.
pub fn split_path(path: &str) -> ProxyResult<(String, Option<String>)> {
    let p = path.strip_prefix('/').unwrap_or(path);
    if p.is_empty() {
        return Err(ProxyError::InvalidUrl("empty path".into()));
    }

    if p.starts_with("http://") || p.starts_with("https://") {
        return Ok((p.to_string(), None));
    }

    let idx = match (p.find("/http://"), p.find("/https://")) {
        (Some(i), Some(j)) => Some(i.min(j)),
        (Some(i), None) => Some(i),
        (None, Some(j)) => Some(j),
        (None, None) => None,
    };

    match idx {
        Some(i) if i > 0 => Ok((p[i + 1..].to_string(), Some(p[..i].to_string()))),
        _ => Err(ProxyError::InvalidUrl(
            "expected /http(s)://... or /<proxySpec>/http(s)://...".into(),
        )),
    }
}

/// Parse a target string into a URL with non-empty scheme and host.
pub fn parse_target(target: &str) -> ProxyResult<Url> {
    let url = Url::parse(target).map_err(|e| ProxyError::InvalidUrl(e.to_string()))?;
    if url.scheme().is_empty() || url.host_str().map_or(true, str::is_empty) {
        return Err(ProxyError::InvalidUrl(target.to_string()));
    }
    Ok(url)
}

/// Resolve the inbound path to a target, falling back to Referer-based
/// reconstruction when the path carries no URL pattern of its own.
pub fn resolve_target(
    path: &str,
    referer_header: Option<&str>,
    own_authority: Option<&str>,
) -> ProxyResult<ResolvedTarget> {
    match split_path(path) {
        Ok((target, proxy_spec)) => {
            let url = parse_target(&target)?;
            Ok(ResolvedTarget { url, proxy_spec })
        }
        Err(_) => referer::resolve_from_referer(path, referer_header, own_authority),
    }
}
