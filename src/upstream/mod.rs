//! Upstream transport subsystem.
//!
//! # Data Flow
//! ```text
//! Raw proxy spec string (optional)
//!     → spec.rs (disambiguate into a canonical ProxySpec)
//!     → client.rs (build a per-request client: direct / HTTP proxy / SOCKS5)
//!     → forward() issues the call, following redirects with per-hop
//!       header sanitation and SSRF re-validation
//! ```
//!
//! # Design Decisions
//! - One client per request, pinned to the SSRF-validated addresses when
//!   dialing directly; an upstream proxy performs its own resolution
//! - SOCKS5 uses the socks5h scheme so hostname resolution happens at the
//!   proxy, never at the local resolver
//! - The client never follows redirects itself; the explicit loop owns the
//!   hop budget and the per-hop sanitation

pub mod client;
pub mod spec;

pub use spec::{ProxyScheme, ProxySpec};
