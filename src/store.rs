//! Credential store contract and in-memory implementation.
//!
//! The store owns the persistent user records; the authenticator is the
//! only component that mutates them, and only through the four
//! operations of [`CredentialStore`]. The lockout bookkeeping is part of
//! the contract, not the caller's problem:
//!
//! - [`CredentialStore::record_failure`] performs the attempt increment
//!   and the conditional lock-set as ONE atomic step, so concurrent
//!   failed logins for the same username cannot lose updates.
//! - [`CredentialStore::record_success`] resets the counter to zero,
//!   clears the lock, and stamps the last-login time in one step.
//!
//! [`MemoryCredentialStore`] is suitable for single-instance
//! deployments and tests. For a shared relational backend, enable the
//! `postgres` feature and use [`crate::database::PgCredentialStore`].

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::role::Role;

// ============================================================================
// Records
// ============================================================================

/// Lifecycle status of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    /// Storage name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "suspended" => Ok(Self::Suspended),
            other => Err(StoreError::Query(format!("unknown user status: {}", other))),
        }
    }
}

/// A user row joined with its employee, location, and department
/// context, as resolved by the active-user lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: i64,
    pub employee_id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub login_attempts: u32,
    pub account_locked: bool,
    /// Unix timestamp of the last successful login, if any.
    pub last_login: Option<i64>,
    pub status: UserStatus,

    // Joined employee context
    pub first_name: String,
    pub last_name: String,
    pub employee_code: String,
    pub position: String,

    // Joined location context
    pub location_id: i64,
    pub location_name: String,
    pub location_code: String,

    // Joined department context
    pub department_id: i64,
    pub department_name: String,
}

impl UserRecord {
    /// Display name assembled from the employee record.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Lockout-relevant columns of a user row, looked up by username with
/// no status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutState {
    pub login_attempts: u32,
    pub account_locked: bool,
}

impl LockoutState {
    /// Whether this state blocks a login attempt outright.
    pub fn blocks_login(&self, max_attempts: u32) -> bool {
        self.account_locked || self.login_attempts >= max_attempts
    }
}

/// Result of recording a failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureOutcome {
    /// Attempt count after the increment.
    pub attempts: u32,
    /// Whether the account is locked after this failure.
    pub locked: bool,
}

impl FailureOutcome {
    /// Whether this particular failure crossed the threshold and locked
    /// the account (as opposed to it having been locked already).
    pub fn newly_locked(&self, max_attempts: u32) -> bool {
        self.locked && self.attempts == max_attempts
    }
}

// ============================================================================
// Store Contract
// ============================================================================

/// Persistence operations the authenticator needs.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Lockout-relevant state for a username, regardless of account
    /// status. `None` if no such user exists.
    async fn lockout_state(&self, username: &str) -> Result<Option<LockoutState>, StoreError>;

    /// Look up an active user by username, with location and department
    /// context joined in. `None` if no active user matches.
    async fn find_active(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Record a failed verification: increment the attempt counter and,
    /// if it reaches `max_attempts`, set the lock. Both writes happen
    /// in one atomic step.
    ///
    /// A nonexistent username is a no-op returning a zeroed outcome;
    /// unknown usernames never accumulate attempts.
    async fn record_failure(
        &self,
        username: &str,
        max_attempts: u32,
    ) -> Result<FailureOutcome, StoreError>;

    /// Record a successful login: reset the attempt counter, clear the
    /// lock, and stamp `last_login` with `now`.
    async fn record_success(&self, user_id: i64, now: i64) -> Result<(), StoreError>;
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// In-memory credential store for single-instance use and tests.
///
/// The increment-and-maybe-lock step runs under one write lock, which
/// gives the same atomicity the relational store gets from a single
/// UPDATE statement.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user record, keyed by username.
    pub fn insert(&self, record: UserRecord) {
        if let Ok(mut users) = self.users.write() {
            users.insert(record.username.clone(), record);
        }
    }

    /// Snapshot of a user record, for inspection in tests and admin
    /// tooling.
    pub fn snapshot(&self, username: &str) -> Option<UserRecord> {
        self.users.read().ok()?.get(username).cloned()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn lockout_state(&self, username: &str) -> Result<Option<LockoutState>, StoreError> {
        let users = self
            .users
            .read()
            .map_err(|_| StoreError::Query("user store lock poisoned".into()))?;

        Ok(users.get(username).map(|u| LockoutState {
            login_attempts: u.login_attempts,
            account_locked: u.account_locked,
        }))
    }

    async fn find_active(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self
            .users
            .read()
            .map_err(|_| StoreError::Query("user store lock poisoned".into()))?;

        Ok(users
            .get(username)
            .filter(|u| u.status == UserStatus::Active)
            .cloned())
    }

    async fn record_failure(
        &self,
        username: &str,
        max_attempts: u32,
    ) -> Result<FailureOutcome, StoreError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| StoreError::Query("user store lock poisoned".into()))?;

        match users.get_mut(username) {
            Some(user) => {
                user.login_attempts += 1;
                if user.login_attempts >= max_attempts {
                    user.account_locked = true;
                }
                Ok(FailureOutcome {
                    attempts: user.login_attempts,
                    locked: user.account_locked,
                })
            }
            // No row to increment.
            None => Ok(FailureOutcome {
                attempts: 0,
                locked: false,
            }),
        }
    }

    async fn record_success(&self, user_id: i64, now: i64) -> Result<(), StoreError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| StoreError::Query("user store lock poisoned".into()))?;

        if let Some(user) = users.values_mut().find(|u| u.user_id == user_id) {
            user.login_attempts = 0;
            user.account_locked = false;
            user.last_login = Some(now);
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
