//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Required values (the bucket) and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before any socket is bound or client is built

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// Log formats accepted in `observability.log_format`.
pub const LOG_FORMATS: &[&str] = &["text", "json"];

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("bucket name is required")]
    MissingBucket,

    #[error("region must not be empty")]
    EmptyRegion,

    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("endpoint '{0}' must be an http:// or https:// URL")]
    InvalidEndpoint(String),

    #[error("unknown log format '{0}'")]
    UnknownLogFormat(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// DNS-style host name such as `localhost` or `proxy.internal`.
///
/// The listener resolves it at bind time.
fn is_hostname(host: &str) -> bool {
    !host.is_empty()
        && host.len() <= 253
        && host.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Check a fully overlaid configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.storage.bucket.trim().is_empty() {
        errors.push(ValidationError::MissingBucket);
    }

    if config.storage.region.trim().is_empty() {
        errors.push(ValidationError::EmptyRegion);
    }

    let bind_address = config.listener.bind_address();
    if bind_address.parse::<SocketAddr>().is_err() && !is_hostname(&config.listener.host) {
        errors.push(ValidationError::InvalidBindAddress(bind_address));
    }

    if let Some(endpoint) = &config.storage.endpoint {
        let has_scheme = endpoint
            .strip_prefix("http://")
            .or_else(|| endpoint.strip_prefix("https://"))
            .is_some_and(|rest| !rest.is_empty());
        if !has_scheme {
            errors.push(ValidationError::InvalidEndpoint(endpoint.clone()));
        }
    }

    let format = config.observability.log_format.to_ascii_lowercase();
    if !LOG_FORMATS.contains(&format.as_str()) {
        errors.push(ValidationError::UnknownLogFormat(
            config.observability.log_format.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
