//! Postgres-backed credential store and audit sink.
//!
//! Connection pooling uses conservative, security-minded defaults:
//! bounded pool size, aggressive acquire timeout, connections verified
//! before hand-out, TLS preferred and optionally required.
//!
//! The lockout bookkeeping is race-free by construction: the attempt
//! increment and the conditional lock-set execute as a single UPDATE,
//! so two concurrent failed logins for the same username serialize on
//! the row and neither update is lost.
//!
//! # Usage
//!
//! ```ignore
//! use portcullis::database::{DatabaseConfig, create_pool, PgCredentialStore, PgAuditSink};
//!
//! let pool = create_pool(&DatabaseConfig::from_env()).await?;
//! let store = PgCredentialStore::new(pool.clone());
//! let sink = PgAuditSink::new(pool);
//! ```

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{PgPool, Row};
use tracing::info;

use crate::audit::{AuditEvent, AuditSink};
use crate::error::{AuditError, StoreError};
use crate::role::Role;
use crate::store::{CredentialStore, FailureOutcome, LockoutState, UserRecord, UserStatus};

// ============================================================================
// Pool Configuration
// ============================================================================

/// Database connection configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Postgres connection URL.
    pub database_url: String,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain.
    pub min_connections: u32,
    /// Maximum time to wait for a connection from the pool.
    pub acquire_timeout: Duration,
    /// Require TLS on the connection instead of merely preferring it.
    pub require_ssl: bool,
}

impl DatabaseConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: Postgres connection URL (required)
    /// - `DB_MAX_CONNECTIONS`: max pool size (default: 10)
    /// - `DB_MIN_CONNECTIONS`: min idle connections (default: 1)
    /// - `DB_ACQUIRE_TIMEOUT`: acquire timeout in seconds (default: 30)
    /// - `DB_REQUIRE_SSL`: "true"/"false" (default: true)
    ///
    /// # Panics
    ///
    /// Panics if `DATABASE_URL` is not set.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL environment variable must be set");

        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let min_connections = std::env::var("DB_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        let acquire_timeout = std::env::var("DB_ACQUIRE_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let require_ssl = std::env::var("DB_REQUIRE_SSL")
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(true);

        Self {
            database_url,
            max_connections,
            min_connections,
            acquire_timeout,
            require_ssl,
        }
    }
}

/// Create a connection pool with the given configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    let connect_options = PgConnectOptions::from_str(&config.database_url)
        .map_err(|e| StoreError::Connection(format!("invalid DATABASE_URL: {}", e)))?
        .ssl_mode(if config.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        });

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await
        .map_err(|e| StoreError::Connection(format!("failed to connect: {}", e)))?;

    info!(
        max_connections = config.max_connections,
        require_ssl = config.require_ssl,
        "Database connection pool initialized"
    );

    Ok(pool)
}

fn map_sqlx_error(error: sqlx::Error) -> StoreError {
    match error {
        sqlx::Error::Io(e) => StoreError::Connection(e.to_string()),
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Connection(error.to_string())
        }
        other => StoreError::Query(other.to_string()),
    }
}

// ============================================================================
// Credential Store
// ============================================================================

/// [`CredentialStore`] over the `users` table and its joined context.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn lockout_state(&self, username: &str) -> Result<Option<LockoutState>, StoreError> {
        let row = sqlx::query(
            "SELECT login_attempts, account_locked FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(|row| {
            let attempts: i32 = row.try_get("login_attempts").map_err(map_sqlx_error)?;
            let locked: bool = row.try_get("account_locked").map_err(map_sqlx_error)?;
            Ok(LockoutState {
                login_attempts: attempts.max(0) as u32,
                account_locked: locked,
            })
        })
        .transpose()
    }

    async fn find_active(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT u.user_id, u.employee_id, u.username, u.password_hash, u.role,
                   u.login_attempts, u.account_locked,
                   CAST(EXTRACT(EPOCH FROM u.last_login) AS BIGINT) AS last_login,
                   u.status,
                   e.first_name, e.last_name, e.employee_code, e.position,
                   e.location_id, l.location_name, l.location_code,
                   e.department_id, d.department_name
              FROM users u
              JOIN employees e ON u.employee_id = e.employee_id
              JOIN locations l ON e.location_id = l.location_id
              JOIN departments d ON e.department_id = d.department_id
             WHERE u.username = $1 AND u.status = 'active'
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(|row| {
            let role: String = row.try_get("role").map_err(map_sqlx_error)?;
            let status: String = row.try_get("status").map_err(map_sqlx_error)?;
            let attempts: i32 = row.try_get("login_attempts").map_err(map_sqlx_error)?;

            Ok(UserRecord {
                user_id: row.try_get("user_id").map_err(map_sqlx_error)?,
                employee_id: row.try_get("employee_id").map_err(map_sqlx_error)?,
                username: row.try_get("username").map_err(map_sqlx_error)?,
                password_hash: row.try_get("password_hash").map_err(map_sqlx_error)?,
                role: role.parse::<Role>().map_err(|e| StoreError::Query(e.to_string()))?,
                login_attempts: attempts.max(0) as u32,
                account_locked: row.try_get("account_locked").map_err(map_sqlx_error)?,
                last_login: row.try_get("last_login").map_err(map_sqlx_error)?,
                status: status.parse::<UserStatus>()?,
                first_name: row.try_get("first_name").map_err(map_sqlx_error)?,
                last_name: row.try_get("last_name").map_err(map_sqlx_error)?,
                employee_code: row.try_get("employee_code").map_err(map_sqlx_error)?,
                position: row.try_get("position").map_err(map_sqlx_error)?,
                location_id: row.try_get("location_id").map_err(map_sqlx_error)?,
                location_name: row.try_get("location_name").map_err(map_sqlx_error)?,
                location_code: row.try_get("location_code").map_err(map_sqlx_error)?,
                department_id: row.try_get("department_id").map_err(map_sqlx_error)?,
                department_name: row.try_get("department_name").map_err(map_sqlx_error)?,
            })
        })
        .transpose()
    }

    async fn record_failure(
        &self,
        username: &str,
        max_attempts: u32,
    ) -> Result<FailureOutcome, StoreError> {
        // Increment and conditional lock-set in one statement: the row
        // lock serializes concurrent failures, so no update is lost.
        let row = sqlx::query(
            r#"
            UPDATE users
               SET login_attempts = login_attempts + 1,
                   account_locked = account_locked OR login_attempts + 1 >= $2
             WHERE username = $1
            RETURNING login_attempts, account_locked
            "#,
        )
        .bind(username)
        .bind(max_attempts as i32)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => {
                let attempts: i32 = row.try_get("login_attempts").map_err(map_sqlx_error)?;
                let locked: bool = row.try_get("account_locked").map_err(map_sqlx_error)?;
                Ok(FailureOutcome {
                    attempts: attempts.max(0) as u32,
                    locked,
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
        sqlx::query(
            r#"
            UPDATE users
               SET login_attempts = 0,
                   account_locked = FALSE,
                   last_login = to_timestamp($2)
             WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(now as f64)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}

// ============================================================================
// Audit Sink
// ============================================================================

/// [`AuditSink`] appending to the `system_logs` table.
///
/// The table is append-only; this sink only ever inserts.
#[derive(Debug, Clone)]
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn append(&self, event: &AuditEvent) -> Result<(), AuditError> {
        sqlx::query(
            r#"
            INSERT INTO system_logs
                (user_id, action, module, description, ip_address, user_agent, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, to_timestamp($7))
            "#,
        )
        .bind(event.user_id)
        .bind(&event.action)
        .bind(&event.module)
        .bind(&event.description)
        .bind(&event.ip_address)
        .bind(&event.user_agent)
        .bind(event.created_at as f64)
        .execute(&self.pool)
        .await
        .map_err(|e| AuditError::Sink(e.to_string()))?;

        Ok(())
    }
}
