//! URL rewriting over response bodies.
//!
//! # Responsibilities
//! - Decide which content types are eligible for rewriting
//! - Discover URL tokens in markup, stylesheets, scripts, and meta-refresh
//! - Route every discovered URL back through this service's base URL
//!
//! # Design Decisions
//! - URLs already pointing at the proxy base, and non-navigable schemes
//!   (data/anchor/javascript/mailto/tel/ftp), are left untouched
//! - Relative references resolve against the fetched document's directory
//!   before the absolute-path rule applies

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use url::Url;

/// Attribute tokens carrying navigable URLs. data-* names are listed before
/// their bare counterparts so the longer form wins the alternation.
static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(data-src|data-href|data-url|data-original|href|src|action)\s*=\s*("[^"]*"|'[^']*')"#,
    )
    .unwrap()
});

/// CSS url(...) with quoted or bare argument.
static CSS_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)url\(\s*("[^"]*"|'[^']*'|[^'")\s][^)]*?)\s*\)"#).unwrap());

/// Meta-refresh url= fragment inside a content attribute.
static META_REFRESH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(content\s*=\s*["']\s*\d+\s*;\s*url=)([^"']+)"#).unwrap());

/// Quoted absolute or protocol-relative URL strings (scripts, JSON blobs).
static QUOTED_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(https?://[^"]+|//[A-Za-z0-9][^"]*)"|'(https?://[^']+|//[A-Za-z0-9][^']*)'"#)
        .unwrap()
});

/// Schemes and fragments that must never be routed through the proxy.
const SKIP_PREFIXES: [&str; 8] = [
    "data:",
    "#",
    "javascript:",
    "mailto:",
    "tel:",
    "ftp:",
    "about:",
    "blob:",
];

/// Content types eligible for rewriting.
pub fn is_rewritable(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    matches!(
        essence.as_str(),
        "text/html"
            | "application/xhtml+xml"
            | "text/css"
            | "text/javascript"
            | "application/javascript"
            | "application/x-javascript"
            | "text/xml"
            | "application/xml"
            | "text/plain"
    )
}

/// Transient rewriting state for one response: where the document came from
/// and where this service lives.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    /// URL the document was actually fetched from (after redirects).
    base: Url,
    /// This service's own base URL, no trailing slash.
    proxy_base: String,
}

impl RewriteContext {
    pub fn new(base: Url, proxy_base: impl Into<String>) -> Self {
        let mut proxy_base = proxy_base.into();
        while proxy_base.ends_with('/') {
            proxy_base.pop();
        }
        Self { base, proxy_base }
    }

    /// Rewrite every discovered URL token in the body.
    pub fn rewrite(&self, body: &str) -> String {
        let pass1 = ATTR_RE.replace_all(body, |caps: &Captures| {
            let quoted = &caps[2];
            let quote = &quoted[..1];
            let value = &quoted[1..quoted.len() - 1];
            match self.rewrite_url(value) {
                Some(new) => format!("{}={}{}{}", &caps[1], quote, new, quote),
                None => caps[0].to_string(),
            }
        });

        let pass2 = CSS_URL_RE.replace_all(&pass1, |caps: &Captures| {
            let arg = caps[1].trim();
            let (quote, value) = match arg.chars().next() {
                Some(q @ ('"' | '\'')) => (Some(q), arg.trim_matches(q)),
                _ => (None, arg),
            };
            match self.rewrite_url(value) {
                Some(new) => match quote {
                    Some(q) => format!("url({q}{new}{q})"),
                    None => format!("url({new})"),
                },
                None => caps[0].to_string(),
            }
        });

        let pass3 = META_REFRESH_RE.replace_all(&pass2, |caps: &Captures| {
            match self.rewrite_url(&caps[2]) {
                Some(new) => format!("{}{}", &caps[1], new),
                None => caps[0].to_string(),
            }
        });

        let pass4 = QUOTED_URL_RE.replace_all(&pass3, |caps: &Captures| {
            let (quote, value) = match (caps.get(1), caps.get(2)) {
                (Some(m), _) => ('"', m.as_str()),
                (_, Some(m)) => ('\'', m.as_str()),
                _ => return caps[0].to_string(),
            };
            match self.rewrite_url(value) {
                Some(new) => format!("{quote}{new}{quote}"),
                None => caps[0].to_string(),
            }
        });

        pass4.into_owned()
    }

    /// Rewrite one URL token, or None to leave it unchanged.
    fn rewrite_url(&self, raw: &str) -> Option<String> {
        let token = raw.trim();
        if token.is_empty() || token.starts_with(&self.proxy_base) {
            return None;
        }
        let lowered = token.to_ascii_lowercase();
        if SKIP_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
            return None;
        }

        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            return Some(format!("{}/{}", self.proxy_base, token));
        }
        if token.starts_with("//") {
            return Some(format!("{}/https:{}", self.proxy_base, token));
        }
        if token.starts_with('/') {
            let origin = self.base.origin().ascii_serialization();
            return Some(format!("{}/{}{}", self.proxy_base, origin, token));
        }

        // Relative reference: resolve against the document directory, then
        // the absolute rule applies.
        let resolved = self.base.join(token).ok()?;
        Some(format!("{}/{}", self.proxy_base, resolved))
    }
}
