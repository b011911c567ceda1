//! Common imports for applications using this crate.
//!
//! ```ignore
//! use portcullis::prelude::*;
//!
//! let config = AuthConfig::from_env();
//! let authenticator = Authenticator::new(&store, &sink, config.clone());
//! ```

// =============================================================================
// Configuration
// =============================================================================

pub use crate::config::{AuthConfig, AuthConfigBuilder};

// =============================================================================
// Authentication
// =============================================================================

pub use crate::authenticator::Authenticator;
pub use crate::error::{AuditError, LoginError, StoreError};
pub use crate::validation::{Credentials, Validate, ValidationError};

// =============================================================================
// Sessions & Authorization
// =============================================================================

pub use crate::role::Role;
pub use crate::session::{Session, SessionAuthority, SessionState};

// =============================================================================
// Credential Store
// =============================================================================

pub use crate::store::{
    CredentialStore, FailureOutcome, LockoutState, MemoryCredentialStore, UserRecord, UserStatus,
};

// =============================================================================
// Audit
// =============================================================================

pub use crate::audit::{record, AuditEvent, AuditSink, ClientMeta, MemoryAuditSink};

// =============================================================================
// Observability
// =============================================================================

pub use crate::events::{SecurityEvent, Severity};
pub use crate::observability::{init_tracing, LogFormat, ObservabilityConfig};

// =============================================================================
// Database (feature: postgres)
// =============================================================================

#[cfg(feature = "postgres")]
pub use crate::database::{create_pool, DatabaseConfig, PgAuditSink, PgCredentialStore};

// =============================================================================
// External re-exports for convenience
// =============================================================================

pub use tracing::{debug, error, info, trace, warn};
