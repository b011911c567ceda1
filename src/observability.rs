//! Logging initialization.
//!
//! The application code uses standard `tracing` macros (directly and
//! via [`crate::security_event!`]) and does not know how output is
//! formatted. This module configures the subscriber once at startup.
//!
//! # Usage
//!
//! ```ignore
//! use portcullis::observability::{ObservabilityConfig, init_tracing};
//!
//! init_tracing(&ObservabilityConfig::from_env())?;
//! ```

use std::fmt;

use tracing_subscriber::{fmt as fmt_layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output for development.
    Pretty,
    /// One JSON object per line for log pipelines.
    Json,
    /// Single-line human-readable output.
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "portcullis=info".to_string(),
            log_format: LogFormat::Compact,
        }
    }
}

impl ObservabilityConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `RUST_LOG`: tracing filter directives (takes precedence)
    /// - `LOG_FILTER`: fallback filter (default: "portcullis=info")
    /// - `LOG_FORMAT`: "pretty" | "json" | "compact" (default: compact)
    pub fn from_env() -> Self {
        let log_filter = std::env::var("LOG_FILTER")
            .unwrap_or_else(|_| "portcullis=info".to_string());

        let log_format = std::env::var("LOG_FORMAT")
            .map(|s| match s.to_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => LogFormat::Compact,
            })
            .unwrap_or(LogFormat::Compact);

        Self {
            log_filter,
            log_format,
        }
    }
}

/// Initialize the tracing subscriber.
///
/// Call once at application startup, before any logging occurs.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<(), ObservabilityError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .map_err(|e| ObservabilityError::Config(format!("invalid log filter: {}", e)))?;

    let subscriber = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Pretty => subscriber
            .with(fmt_layer::layer().pretty().with_target(true))
            .try_init(),
        LogFormat::Json => subscriber
            .with(fmt_layer::layer().json().with_target(true))
            .try_init(),
        LogFormat::Compact => subscriber
            .with(fmt_layer::layer().compact().with_target(true))
            .try_init(),
    }
    .map_err(|e| ObservabilityError::Provider(format!("failed to init tracing: {}", e)))
}

/// Observability initialization errors.
#[derive(Debug)]
pub enum ObservabilityError {
    /// Invalid configuration.
    Config(String),
    /// Subscriber initialization failed.
    Provider(String),
}

impl fmt::Display for ObservabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "observability config error: {}", msg),
            Self::Provider(msg) => write!(f, "observability provider error: {}", msg),
        }
    }
}

impl std::error::Error for ObservabilityError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.log_filter, "portcullis=info");
        assert_eq!(config.log_format, LogFormat::Compact);
    }
}
