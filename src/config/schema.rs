//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the forward proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Redirect-following policy.
    pub forwarding: ForwardingConfig,

    /// SSRF guard and request limits.
    pub security: SecurityConfig,

    /// Content URL rewriting.
    pub rewrite: RewriteConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000"). Overridable via BIND_ADDR.
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Timeout configuration for the outbound call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// End-to-end timeout for one outbound request in seconds.
    pub request_secs: u64,

    /// Idle connection timeout in seconds.
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 30,
            request_secs: 60,
            idle_secs: 90,
        }
    }
}

/// Redirect-following policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Maximum redirect hops to follow; the next response is returned as-is.
    pub max_redirects: u32,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self { max_redirects: 10 }
    }
}

/// SSRF guard and request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Reject targets resolving into private/loopback/link-local ranges.
    /// Only deployments that deliberately proxy into private address space
    /// should turn this off.
    pub block_private_addresses: bool,

    /// Maximum buffered inbound request body in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            block_private_addresses: true,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Content URL rewriting.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Rewrite URLs in HTML/CSS/JS/XML/plain-text responses.
    pub enabled: bool,

    /// Externally visible base URL of this service (e.g. behind TLS
    /// termination). Derived from the inbound Host when unset.
    pub public_base: Option<String>,

    /// Largest declared body the rewriter will buffer; larger responses
    /// stream through unmodified.
    pub max_buffer_bytes: usize,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            public_base: None,
            max_buffer_bytes: 4 * 1024 * 1024, // 4MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_forwarding_contract() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:5000");
        assert_eq!(config.timeouts.request_secs, 60);
        assert_eq!(config.timeouts.connect_secs, 30);
        assert_eq!(config.forwarding.max_redirects, 10);
        assert!(config.security.block_private_addresses);
        assert!(config.rewrite.enabled);
    }

    #[test]
    fn minimal_toml_fills_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:6000"

            [rewrite]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:6000");
        assert!(!config.rewrite.enabled);
        assert_eq!(config.forwarding.max_redirects, 10);
    }
}
