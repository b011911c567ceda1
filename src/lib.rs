//! # Portcullis
//!
//! Authentication and session authority for a multi-location employee
//! management application.
//!
//! This crate provides the security core of the system: credential
//! verification, brute-force lockout, sliding session expiration, and
//! role/location-based authorization. Everything else in the
//! application sits behind these checks.
//!
//! ## Features
//!
//! - **Authenticator**: verifies Argon2id credentials, enforces the
//!   account lockout policy, and creates sessions
//! - **Session Authority**: an explicit per-request session object with
//!   sliding idle-timeout and a strict lifecycle state machine
//! - **Authorization**: a fixed linear role order plus location-level
//!   data isolation between the two business units
//! - **Audit Trail**: best-effort append-only logging of
//!   security-relevant actions
//! - **Security Events**: structured `tracing` events with category and
//!   severity on every authentication decision
//!
//! ## Quick Start
//!
//! ```ignore
//! use portcullis::prelude::*;
//! use portcullis::guard;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! portcullis::observability::init_tracing(&ObservabilityConfig::from_env())?;
//!
//! let config = AuthConfig::from_env();
//! let pool = portcullis::database::create_pool(&DatabaseConfig::from_env()).await?;
//! let store = PgCredentialStore::new(pool.clone());
//! let sink = PgAuditSink::new(pool);
//!
//! // Login request
//! let credentials = Credentials { username, password };
//! credentials.validate()?;
//! let authenticator = Authenticator::new(&store, &sink, config.clone());
//! let session = authenticator.login(&credentials.username, &credentials.password, &client).await?;
//!
//! // Subsequent authenticated request
//! let mut authority = SessionAuthority::authenticated(session, &config);
//! guard::require_role(&mut authority, "hr_manager", guard::DEFAULT_DENIED_REDIRECT)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Storage Backends
//!
//! [`MemoryCredentialStore`](store::MemoryCredentialStore) and
//! [`MemoryAuditSink`](audit::MemoryAuditSink) serve single-instance
//! deployments and tests. Enable the `postgres` feature for the
//! sqlx-backed [`database`] module.

pub mod audit;
pub mod authenticator;
pub mod config;
#[cfg(feature = "postgres")]
pub mod database;
pub mod error;
pub mod events;
pub mod guard;
pub mod observability;
pub mod password;
pub mod prelude;
pub mod role;
pub mod session;
pub mod store;
pub mod validation;

// Re-exports
pub use authenticator::Authenticator;
pub use config::{AuthConfig, AuthConfigBuilder};
pub use error::{AuditError, LoginError, StoreError};
pub use role::Role;
pub use session::{Session, SessionAuthority, SessionState};
pub use store::{CredentialStore, MemoryCredentialStore, UserRecord, UserStatus};
