//! Error taxonomy for the authentication subsystem.
//!
//! The design goal is controlled disclosure: callers receive one of a
//! small set of generic, user-safe messages, while full fault detail is
//! recorded server-side through `tracing`.
//!
//! - [`LoginError`]: the three user-visible login outcomes. The wording
//!   for an unknown username and a wrong password is identical, so the
//!   login form cannot be used to enumerate accounts.
//! - [`StoreError`]: credential-store faults. Never shown to users;
//!   converted to [`LoginError::Unavailable`] at the authenticator
//!   boundary.
//! - [`AuditError`]: audit-sink faults. Swallowed by
//!   [`crate::audit::record`]; auditing must never change the primary
//!   authentication outcome.

use std::fmt;

// ============================================================================
// Login Errors (user-visible)
// ============================================================================

/// Failure outcomes of a login attempt.
///
/// Each variant maps to exactly one stable user-facing message via
/// [`LoginError::user_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginError {
    /// The account is locked, or its failed-attempt counter has reached
    /// the configured maximum. No password comparison was performed.
    Locked,
    /// Unknown username or wrong password. Deliberately a single variant
    /// with a single message.
    InvalidCredentials,
    /// A store-layer fault occurred. Details were logged server-side.
    Unavailable,
}

impl LoginError {
    /// The message safe to show to the end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Locked => {
                "Account is temporarily locked due to multiple failed login attempts."
            }
            Self::InvalidCredentials => "Invalid username or password",
            Self::Unavailable => "An error occurred during login. Please try again.",
        }
    }

    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Locked => "account_locked",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for LoginError {}

// ============================================================================
// Store Errors (server-side only)
// ============================================================================

/// Credential-store faults.
#[derive(Debug)]
pub enum StoreError {
    /// Could not reach the backing store.
    Connection(String),
    /// A query failed or returned malformed data.
    Query(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(msg) => write!(f, "credential store connection error: {}", msg),
            Self::Query(msg) => write!(f, "credential store query error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

// ============================================================================
// Audit Errors (swallowed)
// ============================================================================

/// Audit-sink faults. Callers go through [`crate::audit::record`], which
/// logs and discards these.
#[derive(Debug)]
pub enum AuditError {
    /// The sink rejected or failed to persist the event.
    Sink(String),
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sink(msg) => write!(f, "audit sink error: {}", msg),
        }
    }
}

impl std::error::Error for AuditError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        // Unknown user and wrong password must be indistinguishable.
        assert_eq!(
            LoginError::InvalidCredentials.user_message(),
            "Invalid username or password"
        );
    }

    #[test]
    fn test_lockout_has_distinct_message() {
        assert_ne!(
            LoginError::Locked.user_message(),
            LoginError::InvalidCredentials.user_message()
        );
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Query("bad row".into());
        assert_eq!(format!("{}", err), "credential store query error: bad row");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(LoginError::Locked.code(), "account_locked");
        assert_eq!(LoginError::InvalidCredentials.code(), "invalid_credentials");
        assert_eq!(LoginError::Unavailable.code(), "unavailable");
    }
}
