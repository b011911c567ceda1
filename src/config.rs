//! Authentication policy configuration.
//!
//! Provides a builder-pattern configuration for the two knobs the
//! subsystem exposes: the sliding session idle timeout and the
//! failed-attempt ceiling that triggers an account lockout.
//!
//! # Example
//!
//! ```ignore
//! use portcullis::AuthConfig;
//! use std::time::Duration;
//!
//! // Load from environment variables
//! let config = AuthConfig::from_env();
//!
//! // Or build programmatically
//! let config = AuthConfig::builder()
//!     .session_timeout(Duration::from_secs(30 * 60))
//!     .max_login_attempts(3)
//!     .build();
//! ```

use std::time::Duration;

/// Policy configuration for authentication and session handling.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Sliding idle timeout. A session is invalid once more than this
    /// much time has passed since its last checked activity.
    pub session_timeout: Duration,

    /// Number of failed verifications after which the account locks.
    pub max_login_attempts: u32,
}

impl Default for AuthConfig {
    /// Defaults: 1 hour idle timeout, 5 attempts before lockout.
    fn default() -> Self {
        Self {
            session_timeout: Duration::from_secs(3600),
            max_login_attempts: 5,
        }
    }
}

impl AuthConfig {
    /// Create a new builder.
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::default()
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SESSION_TIMEOUT`: idle timeout in seconds (default: 3600)
    /// - `MAX_LOGIN_ATTEMPTS`: lockout threshold (default: 5)
    pub fn from_env() -> Self {
        let session_timeout = std::env::var("SESSION_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(3600));

        let max_login_attempts = std::env::var("MAX_LOGIN_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Self {
            session_timeout,
            max_login_attempts,
        }
    }

    /// Timeout expressed in whole seconds, the unit session bookkeeping
    /// uses.
    pub fn timeout_secs(&self) -> i64 {
        self.session_timeout.as_secs() as i64
    }
}

/// Builder for [`AuthConfig`].
#[derive(Debug, Clone, Default)]
pub struct AuthConfigBuilder {
    config: AuthConfig,
}

impl AuthConfigBuilder {
    /// Set the sliding idle timeout.
    pub fn session_timeout(mut self, timeout: Duration) -> Self {
        self.config.session_timeout = timeout;
        self
    }

    /// Set the failed-attempt ceiling.
    pub fn max_login_attempts(mut self, attempts: u32) -> Self {
        self.config.max_login_attempts = attempts;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AuthConfig {
        self.config
    }
}
