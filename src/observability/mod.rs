//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request pipeline produces:
//!     → tracing events (structured, request-ID correlated)
//!     → metrics.rs (counters, latency histogram)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Metrics are cheap (atomic increments); recording never fails a request
//! - Upstream host is the only high-cardinality label, mirroring the
//!   per-backend labels a reverse proxy would carry

pub mod metrics;
