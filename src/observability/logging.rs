//! Structured logging.
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies to this
//! crate and to tower-http. Text output by default, JSON on request.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Map a configured level name onto a tracing directive.
///
/// Returns `None` for names that are not a level.
pub fn parse_level(level: &str) -> Option<&'static str> {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

/// Like [`parse_level`], falling back to `info`.
pub fn level_directive(level: &str) -> &'static str {
    parse_level(level).unwrap_or("info")
}

/// Build the filter from `RUST_LOG` or the configured level.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level_directive(&config.log_level);
        format!("s3_proxy={level},tower_http={level}").into()
    })
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logging(config: &ObservabilityConfig) {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    if config.log_format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    if parse_level(&config.log_level).is_none() {
        tracing::warn!(log_level = %config.log_level, "Unknown log level, using info");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_level_names() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("warning"), "warn");
        assert_eq!(level_directive("error"), "error");
        assert_eq!(level_directive("unknown"), "info");
    }

    #[test]
    fn unknown_levels_are_reported() {
        assert_eq!(parse_level("Info"), Some("info"));
        assert_eq!(parse_level("verbose"), None);
        assert_eq!(parse_level(""), None);
    }
}
