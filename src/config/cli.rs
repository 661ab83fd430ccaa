//! Command-line flags and `S3PROXY_*` environment variables.
//!
//! Every flag is optional so that values from a config file survive unless
//! explicitly overridden. Precedence, lowest first:
//! defaults → config file → environment → flags → AWS_* fallbacks.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::Parser;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::ProxyConfig;

/// HTTP proxy server for S3 bucket objects.
#[derive(Debug, Default, Parser)]
#[command(name = "s3-proxy", version)]
#[command(
    about = "HTTP proxy server for S3 bucket objects",
    long_about = "An HTTP server that proxies GET requests to S3 bucket objects, \
                  preserving cache headers and returning generic error messages."
)]
pub struct Args {
    /// Optional TOML configuration file
    #[arg(long, env = "S3PROXY_CONFIG")]
    pub config: Option<PathBuf>,

    /// S3 bucket name (required)
    #[arg(long, env = "S3PROXY_BUCKET")]
    pub bucket: Option<String>,

    /// AWS region [default: us-east-1]
    #[arg(long, env = "S3PROXY_REGION")]
    pub region: Option<String>,

    /// HTTP server port [default: 8080]
    #[arg(long, env = "S3PROXY_PORT")]
    pub port: Option<u16>,

    /// Log level (debug, info, warn, error) [default: info]
    #[arg(long = "loglevel", env = "S3PROXY_LOGLEVEL")]
    pub log_level: Option<String>,

    /// Log format (text, json) [default: text]
    #[arg(long, env = "S3PROXY_LOG_FORMAT")]
    pub log_format: Option<String>,

    /// Custom S3 endpoint URL
    #[arg(long, env = "S3PROXY_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Use path-style addressing for S3
    #[arg(long, env = "S3PROXY_USE_PATH_STYLE", value_parser = BoolishValueParser::new())]
    pub use_path_style: bool,

    /// Deadline for each S3 GetObject call in seconds, 0 disables [default: 30]
    #[arg(long, env = "S3PROXY_FETCH_TIMEOUT_SECS")]
    pub fetch_timeout_secs: Option<u64>,

    /// Expose Prometheus metrics on this address
    #[arg(long, env = "S3PROXY_METRICS_ADDRESS")]
    pub metrics_address: Option<String>,
}

impl Args {
    /// Merge the config file, flags and AWS fallbacks.
    ///
    /// The result is not validated yet: logging is set up from it first so
    /// that validation failures can be reported through the logger.
    pub fn resolve(self) -> Result<ProxyConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };

        let mut config = self.overlay(base);
        apply_aws_fallbacks(&mut config, |name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply explicitly given flags on top of `config`.
    pub fn overlay(self, mut config: ProxyConfig) -> ProxyConfig {
        if let Some(bucket) = self.bucket {
            config.storage.bucket = bucket;
        }
        if let Some(region) = self.region {
            config.storage.region = region;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
        if let Some(endpoint) = self.endpoint.filter(|e| !e.is_empty()) {
            config.storage.endpoint = Some(endpoint);
        }
        if self.use_path_style {
            config.storage.force_path_style = true;
        }
        if let Some(secs) = self.fetch_timeout_secs {
            config.storage.fetch_timeout_secs = secs;
        }
        if let Some(address) = self.metrics_address {
            config.observability.metrics_address = address;
            config.observability.metrics_enabled = true;
        }
        config
    }
}

/// Fill gaps from the standard AWS variables honoured by other S3 tooling.
pub fn apply_aws_fallbacks<F>(config: &mut ProxyConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if config.storage.endpoint.is_none() {
        config.storage.endpoint = env("AWS_ENDPOINT_URL").filter(|e| !e.is_empty());
    }

    if !config.storage.force_path_style {
        if let Some(value) = env("AWS_S3_FORCE_PATH_STYLE") {
            config.storage.force_path_style = value.eq_ignore_ascii_case("true") || value == "1";
        }
    }
}
