//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound connection
//!     → server.rs (Axum setup, single any-method handler)
//!     → request.rs (request ID, authority extraction)
//!     → [resolve → security → upstream → rewrite]
//!     → response.rs (sanitize, rewrite or stream, error bodies)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
