//! Server-side request forgery guard.
//!
//! # Responsibilities
//! - Restrict target schemes to http/https
//! - Reject reserved local hostnames before any resolution
//! - Classify literal IPs and every DNS-resolved address against the
//!   private/loopback/link-local ranges
//! - Return the validated address set so the dialer can be pinned to it
//!
//! # Design Decisions
//! - Fail closed: a multi-homed name with one private address is rejected
//! - Validating the literal host string alone is insufficient; an
//!   attacker-controlled name can resolve to an internal address, so every
//!   resolved address is checked and handed back for pinning

use std::net::{IpAddr, SocketAddr};

use tokio::net::lookup_host;
use url::Url;

use crate::error::{ProxyError, ProxyResult};

/// Hostnames rejected outright, before DNS is consulted.
const BLOCKED_HOSTNAMES: [&str; 2] = ["localhost", "localhost.localdomain"];

/// Validate a resolved target URL before any network call is issued.
///
/// On success returns the address set the target resolved to (a single entry
/// for literal IPs). Callers dialing directly should pin the transport to
/// exactly these addresses; a proxied dial re-resolves at the upstream proxy.
pub async fn validate_target(url: &Url) -> ProxyResult<Vec<SocketAddr>> {
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ProxyError::BlockedScheme(other.to_string())),
    }

    let host = url
        .host_str()
        .ok_or_else(|| ProxyError::InvalidUrl("empty host".into()))?;
    let lowered = host.to_ascii_lowercase();
    if BLOCKED_HOSTNAMES.contains(&lowered.as_str()) {
        return Err(ProxyError::BlockedHost(host.to_string()));
    }

    let port = url.port_or_known_default().unwrap_or(80);

    // Literal IP: classify directly, no resolution. IPv6 literals arrive
    // bracketed in host_str.
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = bare.parse::<IpAddr>() {
        if is_private(ip) {
            return Err(ProxyError::BlockedAddress(ip));
        }
        return Ok(vec![SocketAddr::new(ip, port)]);
    }

    let addrs: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|source| ProxyError::DnsResolutionFailed {
            host: host.to_string(),
            source,
        })?
        .collect();

    if addrs.is_empty() {
        return Err(ProxyError::NoAddress(host.to_string()));
    }
    ensure_all_public(&addrs)?;
    Ok(addrs)
}

/// Reject the whole address set if any member is private. A multi-homed name
/// with one public and one private address is rejected entirely.
fn ensure_all_public(addrs: &[SocketAddr]) -> ProxyResult<()> {
    for addr in addrs {
        if is_private(addr.ip()) {
            return Err(ProxyError::BlockedAddress(addr.ip()));
        }
    }
    Ok(())
}

/// True if the address falls in a private, loopback, or link-local range:
/// 10/8, 172.16/12, 192.168/16, 127/8, 169.254/16, ::1/128, fc00::/7,
/// fe80::/10, plus the unspecified addresses.
pub fn is_private(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let o = v4.octets();
            v4.is_loopback()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || o[0] == 10
                || (o[0] == 172 && (16..=31).contains(&o[1]))
                || (o[0] == 192 && o[1] == 168)
                || (o[0] == 169 && o[1] == 254)
        }
        IpAddr::V6(v6) => {
            // Classify v4-mapped addresses (::ffff:a.b.c.d) by their v4 form.
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_private(IpAddr::V4(v4));
            }
            let s = v6.segments();
            v6.is_loopback()
                || v6.is_unspecified()
                || (s[0] & 0xffc0) == 0xfe80 // fe80::/10
                || (s[0] & 0xfe00) == 0xfc00 // fc00::/7
        }
    }
}
