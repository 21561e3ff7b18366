//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional via CONFIG_PATH)
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks, all errors at once)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc with the HTTP server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no runtime reload
//! - All fields have defaults so the binary runs with no file at all
//! - BIND_ADDR wins over the file, matching the original single-knob contract

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{
    ForwardingConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, RewriteConfig,
    SecurityConfig, TimeoutConfig,
};
