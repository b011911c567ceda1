//! Security event logging.
//!
//! Structured logging for security-relevant events. Every event carries
//! a category and a severity so downstream log pipelines can filter and
//! alert without parsing message text.
//!
//! # Usage
//!
//! ```ignore
//! use portcullis::events::SecurityEvent;
//! use portcullis::security_event;
//!
//! security_event!(
//!     SecurityEvent::AuthenticationFailure,
//!     username = %username,
//!     reason = "invalid_password",
//!     "Authentication failed"
//! );
//! ```

use std::fmt;

/// Security event categories emitted by this subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEvent {
    /// Successful credential verification
    AuthenticationSuccess,
    /// Failed login attempt (unknown user, wrong password, or lockout)
    AuthenticationFailure,
    /// Account locked after reaching the attempt ceiling
    AccountLocked,
    /// Session created after successful login
    SessionCreated,
    /// Session invalidated by idle timeout
    SessionExpired,
    /// Explicit user logout
    Logout,
    /// Authorization check passed
    AccessGranted,
    /// Authorization check failed
    AccessDenied,
}

impl SecurityEvent {
    /// Event category for filtering/grouping.
    pub fn category(&self) -> &'static str {
        match self {
            Self::AuthenticationSuccess
            | Self::AuthenticationFailure
            | Self::AccountLocked => "authentication",

            Self::SessionCreated | Self::SessionExpired | Self::Logout => "session",

            Self::AccessGranted | Self::AccessDenied => "authorization",
        }
    }

    /// Severity level for the event.
    pub fn severity(&self) -> Severity {
        match self {
            Self::AccountLocked => Severity::Critical,

            Self::AuthenticationFailure | Self::AccessDenied => Severity::High,

            Self::AuthenticationSuccess => Severity::Medium,

            Self::SessionCreated
            | Self::SessionExpired
            | Self::Logout
            | Self::AccessGranted => Severity::Low,
        }
    }

    /// Event name as a stable string.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AuthenticationSuccess => "authentication_success",
            Self::AuthenticationFailure => "authentication_failure",
            Self::AccountLocked => "account_locked",
            Self::SessionCreated => "session_created",
            Self::SessionExpired => "session_expired",
            Self::Logout => "logout",
            Self::AccessGranted => "access_granted",
            Self::AccessDenied => "access_denied",
        }
    }
}

impl fmt::Display for SecurityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Event severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Routine operations
    Low,
    /// Important state changes
    Medium,
    /// Security-relevant failures
    High,
    /// Immediate attention required
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Log a security event with structured fields.
///
/// The macro automatically attaches `security_event`, `category`, and
/// `severity` fields and routes to the `tracing` level matching the
/// event's severity.
#[macro_export]
macro_rules! security_event {
    ($event:expr, $($field:tt)*) => {{
        let event = $event;
        let severity = event.severity();
        let category = event.category();
        let event_name = event.name();

        match severity {
            $crate::events::Severity::Critical => {
                ::tracing::error!(
                    security_event = event_name,
                    category = category,
                    severity = "critical",
                    $($field)*
                );
            }
            $crate::events::Severity::High => {
                ::tracing::warn!(
                    security_event = event_name,
                    category = category,
                    severity = "high",
                    $($field)*
                );
            }
            $crate::events::Severity::Medium => {
                ::tracing::info!(
                    security_event = event_name,
                    category = category,
                    severity = "medium",
                    $($field)*
                );
            }
            $crate::events::Severity::Low => {
                ::tracing::debug!(
                    security_event = event_name,
                    category = category,
                    severity = "low",
                    $($field)*
                );
            }
        }
    }};
}

pub use security_event;
