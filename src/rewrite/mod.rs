//! Content rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream response (body + content type)
//!     → content.rs (eligible type? rewrite URL tokens, else pass through)
//!     → href/src/action/data-* attributes, CSS url(), meta-refresh,
//!       quoted absolute strings, all routed back through this service
//! ```
//!
//! # Design Decisions
//! - Stateless: the rewritten page needs no server-side session to keep
//!   navigating through the proxy; anything the rewriter misses is caught by
//!   the Referer fallback in the resolver
//! - Text-level regex passes, not a DOM: robust across HTML/CSS/JS/XML and
//!   cheap enough to run inline

pub mod content;

pub use content::RewriteContext;
