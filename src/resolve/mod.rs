//! Target resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request path (+ Referer, own authority when needed)
//!     → path.rs (direct-URL and spec/URL split)
//!     → referer.rs (fallback: reconstruct context for relative navigation)
//!     → Return: ResolvedTarget { url, proxy_spec } or InvalidUrl
//! ```
//!
//! # Design Decisions
//! - Pure functions of (path, referer, authority); no hidden state; the only
//!   "memory" of a prior proxy spec travels in the Referer header
//! - No silent fallback: an unrelated or absent Referer fails the request
//! - SSRF validation runs on every resolved target afterwards, including
//!   Referer-derived ones

pub mod path;
pub mod referer;

pub use path::{resolve_target, ResolvedTarget};
