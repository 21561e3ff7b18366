//! Referer-based context reconstruction for relative navigation.
//!
//! A rewritten page can still contain URLs the content rewriter missed; the
//! browser resolves those against our own origin and sends us a bare path
//! like `/assets/app.js`. The Referer header of such a request still carries
//! the previously proxied URL (and proxy spec), so the original context is
//! recovered from it, with no server-side session required.

use url::Url;

use crate::error::{ProxyError, ProxyResult};
use crate::resolve::path::{parse_target, split_path, ResolvedTarget};

/// Reconstruct the target for a path with no URL pattern of its own.
///
/// The Referer must have been issued by this service (its authority equals
/// ours); its path is then re-split to recover the proxy spec and base URL,
/// and the current path is resolved against that base with RFC 3986 merge
/// semantics.
pub fn resolve_from_referer(
    current_path: &str,
    referer_header: Option<&str>,
    own_authority: Option<&str>,
) -> ProxyResult<ResolvedTarget> {
    let no_context = || {
        ProxyError::InvalidUrl(
            "path carries no target URL and the request has no usable Referer context".into(),
        )
    };

    let referer = referer_header.ok_or_else(no_context)?;
    let own_authority = own_authority.ok_or_else(no_context)?;

    let referer_url = Url::parse(referer).map_err(|_| no_context())?;
    if !authority_of(&referer_url).eq_ignore_ascii_case(own_authority) {
        return Err(no_context());
    }

    // The Referer path is a previously proxied path: re-run the split to
    // recover the spec and the base document URL.
    let (base_str, proxy_spec) = split_path(referer_url.path())?;
    let base = parse_target(&base_str)?;

    // RFC 3986 merge: an absolute path replaces the base path, a relative
    // path resolves against the base directory.
    let url = base
        .join(current_path)
        .map_err(|e| ProxyError::InvalidUrl(e.to_string()))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ProxyError::InvalidUrl(current_path.to_string()));
    }

    Ok(ResolvedTarget { url, proxy_spec })
}

fn authority_of(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWN: Option<&str> = Some("localhost:5000");

    #[test]
    fn absolute_path_replaces_base_path() {
        let resolved = resolve_from_referer(
            "/a/b",
            Some("http://localhost:5000/https://example.com/x/y"),
            OWN,
        )
        .unwrap();
        assert_eq!(resolved.url.as_str(), "https://example.com/a/b");
        assert_eq!(resolved.proxy_spec, None);
    }

    #[test]
    fn relative_path_resolves_against_base_directory() {
        let resolved = resolve_from_referer(
            "c",
            Some("http://localhost:5000/https://example.com/x/y"),
            OWN,
        )
        .unwrap();
        assert_eq!(resolved.url.as_str(), "https://example.com/x/c");
    }

    #[test]
    fn proxy_spec_recovered_from_referer() {
        let resolved = resolve_from_referer(
            "/app.js",
            Some("http://localhost:5000/proxy.example.com:3128/https://example.com/index.html"),
            OWN,
        )
        .unwrap();
        assert_eq!(resolved.url.as_str(), "https://example.com/app.js");
        assert_eq!(resolved.proxy_spec.as_deref(), Some("proxy.example.com:3128"));
    }

    #[test]
    fn unrelated_referer_rejected() {
        assert!(resolve_from_referer(
            "/a",
            Some("http://evil.example.com/https://example.com/x"),
            OWN,
        )
        .is_err());
    }

    #[test]
    fn missing_referer_rejected() {
        assert!(resolve_from_referer("/a", None, OWN).is_err());
    }

    #[test]
    fn referer_without_proxied_path_rejected() {
        assert!(resolve_from_referer(
            "/a",
            Some("http://localhost:5000/plain-page"),
            OWN,
        )
        .is_err());
    }

    #[test]
    fn authority_comparison_is_case_insensitive() {
        let resolved = resolve_from_referer(
            "/a",
            Some("http://LOCALHOST:5000/https://example.com/x/y"),
            OWN,
        )
        .unwrap();
        assert_eq!(resolved.url.as_str(), "https://example.com/a");
    }

    #[test]
    fn nested_relative_resolution() {
        // Base document sits two directories deep; "../img/logo.png" climbs one.
        let resolved = resolve_from_referer(
            "../img/logo.png",
            Some("http://localhost:5000/https://example.com/a/b/page.html"),
            OWN,
        )
        .unwrap();
        assert_eq!(resolved.url.as_str(), "https://example.com/a/img/logo.png");
    }
}
