//! Credential verification and login orchestration.
//!
//! [`Authenticator::login`] is the single entry point through which user
//! records are mutated. The contract, in order:
//!
//! 1. Lockout gate: a locked account, or one at the attempt ceiling,
//!    fails immediately. No password comparison happens on this branch.
//! 2. Active-user lookup with joined location/department context. An
//!    unknown or non-active username fails with the generic message and
//!    does NOT touch any attempt counter: only known usernames
//!    accumulate attempts.
//! 3. Argon2 verification. A mismatch increments the counter and, at
//!    the ceiling, locks the account (one atomic store step), then
//!    returns the same generic message as step 2.
//! 4. A match resets the counters, stamps `last_login`, builds the
//!    [`Session`], and appends a best-effort `login` audit event.
//!
//! Every store fault is caught here and surfaced as
//! [`LoginError::Unavailable`]; detail goes to the server-side log only.
//!
//! # Usage
//!
//! ```ignore
//! use portcullis::{AuthConfig, Authenticator, SessionAuthority};
//! use portcullis::audit::ClientMeta;
//!
//! let authenticator = Authenticator::new(&store, &audit_sink, AuthConfig::from_env());
//! match authenticator.login(&username, &password, &client).await {
//!     Ok(session) => {
//!         let authority = SessionAuthority::authenticated(session, &config);
//!         // hand the authority to the request context
//!     }
//!     Err(e) => render_error(e.user_message()),
//! }
//! ```

use crate::audit::{self, AuditEvent, AuditSink, ClientMeta};
use crate::config::AuthConfig;
use crate::error::{LoginError, StoreError};
use crate::events::SecurityEvent;
use crate::password;
use crate::security_event;
use crate::session::{now_unix, Session};
use crate::store::CredentialStore;

/// Verifies credentials and enforces the lockout policy.
///
/// Holds borrowed handles for one request/response cycle, like the
/// session authority it feeds.
pub struct Authenticator<'a, S, A> {
    store: &'a S,
    audit: &'a A,
    config: AuthConfig,
}

impl<'a, S, A> Authenticator<'a, S, A>
where
    S: CredentialStore,
    A: AuditSink,
{
    /// Create an authenticator over a credential store and audit sink.
    pub fn new(store: &'a S, audit: &'a A, config: AuthConfig) -> Self {
        Self {
            store,
            audit,
            config,
        }
    }

    /// Verify credentials against the current wall clock.
    ///
    /// Preconditions: `username` and `password` are non-empty; the
    /// request layer rejects empty credentials before calling this (see
    /// [`crate::validation::Credentials`]).
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        client: &ClientMeta,
    ) -> Result<Session, LoginError> {
        self.login_at(username, password, client, now_unix()).await
    }

    /// [`Self::login`] at an explicit time, for deterministic tests.
    pub async fn login_at(
        &self,
        username: &str,
        password: &str,
        client: &ClientMeta,
        now: i64,
    ) -> Result<Session, LoginError> {
        // 1. Lockout gate, checked before any password work.
        let lockout = self
            .store
            .lockout_state(username)
            .await
            .map_err(|e| self.store_fault("lockout_state", e))?;

        if let Some(state) = lockout {
            if state.blocks_login(self.config.max_login_attempts) {
                security_event!(
                    SecurityEvent::AuthenticationFailure,
                    username = %username,
                    ip_address = %client.ip_address.as_deref().unwrap_or("unknown"),
                    reason = "account_locked",
                    "Login attempt against locked account"
                );
                return Err(LoginError::Locked);
            }
        }

        // 2. Active-user lookup. A miss does not increment anything.
        let user = match self
            .store
            .find_active(username)
            .await
            .map_err(|e| self.store_fault("find_active", e))?
        {
            Some(user) => user,
            None => {
                security_event!(
                    SecurityEvent::AuthenticationFailure,
                    username = %username,
                    ip_address = %client.ip_address.as_deref().unwrap_or("unknown"),
                    reason = "unknown_user",
                    "Login attempt for unknown or inactive username"
                );
                return Err(LoginError::InvalidCredentials);
            }
        };

        // 3. Password verification.
        if !password::verify_password(password, &user.password_hash) {
            let outcome = self
                .store
                .record_failure(username, self.config.max_login_attempts)
                .await
                .map_err(|e| self.store_fault("record_failure", e))?;

            if outcome.newly_locked(self.config.max_login_attempts) {
                security_event!(
                    SecurityEvent::AccountLocked,
                    username = %username,
                    failed_attempts = outcome.attempts,
                    "Account locked after repeated failed login attempts"
                );
            }

            security_event!(
                SecurityEvent::AuthenticationFailure,
                username = %username,
                ip_address = %client.ip_address.as_deref().unwrap_or("unknown"),
                failed_attempts = outcome.attempts,
                reason = "invalid_password",
                "Login failed"
            );
            // Same wording as the unknown-user branch.
            return Err(LoginError::InvalidCredentials);
        }

        // 4. Success: reset counters, stamp last_login, create session.
        self.store
            .record_success(user.user_id, now)
            .await
            .map_err(|e| self.store_fault("record_success", e))?;

        let session = Session::from_user(&user, client.clone(), now);

        audit::record(self.audit, AuditEvent::login(user.user_id, client)).await;

        security_event!(
            SecurityEvent::AuthenticationSuccess,
            user_id = user.user_id,
            username = %username,
            ip_address = %client.ip_address.as_deref().unwrap_or("unknown"),
            "User authenticated"
        );
        security_event!(
            SecurityEvent::SessionCreated,
            user_id = user.user_id,
            location_id = user.location_id,
            "Session created"
        );

        Ok(session)
    }

    /// Log a store fault in full and degrade it to the opaque
    /// user-facing failure.
    fn store_fault(&self, stage: &str, error: StoreError) -> LoginError {
        tracing::error!(
            stage = stage,
            error = %error,
            "Credential store fault during login"
        );
        LoginError::Unavailable
    }
}

// ============================================================================
// Tests
// ============================================================================
