//! Rust Production Forward Proxy Library

pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod resolve;
pub mod rewrite;
pub mod security;
pub mod upstream;

pub use config::ProxyConfig;
pub use error::{ProxyError, ProxyResult};
pub use http::HttpServer;
