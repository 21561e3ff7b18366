//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and addresses before the config is accepted
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: ProxyConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic violation in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("timeout '{0}' must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("rewrite.public_base '{0}' is not an absolute http(s) URL")]
    RewriteBase(String),

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodySize,
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    for (name, value) in [
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.idle_secs", config.timeouts.idle_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if let Some(base) = &config.rewrite.public_base {
        let parsed = Url::parse(base);
        let ok = parsed
            .as_ref()
            .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
            .unwrap_or(false);
        if !ok {
            errors.push(ValidationError::RewriteBase(base.clone()));
        }
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodySize);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn all_errors_reported_at_once() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-addr".into();
        config.timeouts.connect_secs = 0;
        config.security.max_body_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn rewrite_base_must_be_absolute_http() {
        let mut config = ProxyConfig::default();
        config.rewrite.public_base = Some("ftp://proxy.example.com".into());
        assert!(validate_config(&config).is_err());

        config.rewrite.public_base = Some("http://proxy.example.com:5000".into());
        assert!(validate_config(&config).is_ok());
    }
}
