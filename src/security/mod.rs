//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Resolved target URL:
//!     → ssrf.rs (scheme check, reserved-name check, address classification,
//!                DNS resolution with fail-closed multi-address policy)
//!     → validated SocketAddr set handed to the transport for dialer pinning
//!
//! Header multimap (both directions, every redirect hop):
//!     → headers.rs (hop-by-hop + sensitive removal, Set-Cookie on responses)
//!     → sanitized copy forwarded
//! ```
//!
//! # Design Decisions
//! - Fail closed: one private address among many public ones rejects the host
//! - Policy tables are module constants, treated as immutable configuration
//! - Sanitization is a pure copy-transform, idempotent by construction

pub mod headers;
pub mod ssrf;
