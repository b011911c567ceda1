//! Caller-side input validation.
//!
//! Empty or oversized credentials are rejected at the request layer,
//! before the authenticator is involved; the authenticator's
//! precondition is that both fields are non-empty.
//!
//! # Usage
//!
//! ```ignore
//! use portcullis::validation::{Credentials, Validate};
//!
//! let form = Credentials {
//!     username: input.username.trim().to_string(),
//!     password: input.password,
//! };
//! form.validate()?; // ValidationError before any store round-trip
//! ```

use std::fmt;

/// Validation error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Field that failed validation.
    pub field: String,
    /// Error code for programmatic handling.
    pub code: ValidationErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl ValidationError {
    /// Create a validation error for a specific field.
    pub fn for_field(
        field: impl Into<String>,
        code: ValidationErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// Value is required but missing/empty.
    Required,
    /// Value exceeds its length bound.
    TooLong,
}

/// Types that validate themselves before use.
pub trait Validate {
    /// Check all fields, failing on the first violation.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Reject empty (or whitespace-only) values.
pub fn validate_required(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::for_field(
            field,
            ValidationErrorCode::Required,
            "Please enter both username and password.",
        ));
    }
    Ok(())
}

/// Reject values longer than `max` bytes.
pub fn validate_max_length(value: &str, max: usize, field: &str) -> Result<(), ValidationError> {
    if value.len() > max {
        return Err(ValidationError::for_field(
            field,
            ValidationErrorCode::TooLong,
            format!("must be at most {} characters", max),
        ));
    }
    Ok(())
}

/// A login form submission.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Validate for Credentials {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_required(&self.username, "username")?;
        validate_required(&self.password, "password")?;
        validate_max_length(&self.username, 64, "username")?;
        validate_max_length(&self.password, 128, "password")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_credentials_pass() {
        assert!(credentials("amal", "winter-moss-042").validate().is_ok());
    }

    #[test]
    fn test_empty_username_rejected() {
        let err = credentials("", "pw").validate().unwrap_err();
        assert_eq!(err.field, "username");
        assert_eq!(err.code, ValidationErrorCode::Required);
    }

    #[test]
    fn test_empty_password_rejected() {
        let err = credentials("amal", "").validate().unwrap_err();
        assert_eq!(err.field, "password");
        assert_eq!(err.code, ValidationErrorCode::Required);
    }

    #[test]
    fn test_whitespace_only_rejected() {
        assert!(credentials("   ", "pw").validate().is_err());
        assert!(credentials("amal", "  \t").validate().is_err());
    }

    #[test]
    fn test_oversized_fields_rejected() {
        let long = "x".repeat(200);
        assert_eq!(
            credentials(&long, "pw").validate().unwrap_err().code,
            ValidationErrorCode::TooLong
        );
        assert_eq!(
            credentials("amal", &long).validate().unwrap_err().code,
            ValidationErrorCode::TooLong
        );
    }
}
