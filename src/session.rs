//! Session authority: the authenticated principal for one request.
//!
//! The session is an explicit object owned by the request-handling layer
//! for exactly one request/response cycle; there is no process-wide
//! session state. [`SessionAuthority`] wraps the optional [`Session`]
//! and answers the questions every authenticated request asks: is the
//! session still live, and what is it allowed to do.
//!
//! # Sliding expiration
//!
//! Expiration is sliding, not an absolute deadline: every successful
//! [`SessionAuthority::check_timeout`] advances `last_activity`, so an
//! active user never times out. There is no background sweep; an idle
//! session is detected lazily on the next check.
//!
//! # State machine
//!
//! ```text
//! Anonymous --(login success)--> Authenticated
//! Authenticated --(idle > timeout, lazy)--> Expired    (terminal)
//! Authenticated --(explicit logout)-----> LoggedOut    (terminal)
//! ```
//!
//! No transition returns to Authenticated without a fresh successful
//! login.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::audit::{self, AuditEvent, AuditSink, ClientMeta};
use crate::config::AuthConfig;
use crate::events::SecurityEvent;
use crate::role::Role;
use crate::security_event;
use crate::store::UserRecord;

/// Current Unix time in whole seconds.
pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

// ============================================================================
// Session
// ============================================================================

/// The authenticated principal with its resolved location and
/// department context.
///
/// Created by the authenticator on successful login; destroyed on
/// explicit logout or detected timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub employee_id: i64,
    pub username: String,
    pub role: Role,
    pub full_name: String,
    pub employee_code: String,
    pub position: String,
    pub location_id: i64,
    pub location_name: String,
    pub location_code: String,
    pub department_id: i64,
    pub department_name: String,
    /// Unix timestamp of the successful login.
    pub login_time: i64,
    /// Unix timestamp of the most recent checked activity.
    pub last_activity: i64,
    /// Client metadata captured at login, reused for the logout audit
    /// record.
    pub client: ClientMeta,
}

impl Session {
    /// Build a session from a verified user record at time `now`.
    pub fn from_user(user: &UserRecord, client: ClientMeta, now: i64) -> Self {
        Self {
            user_id: user.user_id,
            employee_id: user.employee_id,
            username: user.username.clone(),
            role: user.role,
            full_name: user.full_name(),
            employee_code: user.employee_code.clone(),
            position: user.position.clone(),
            location_id: user.location_id,
            location_name: user.location_name.clone(),
            location_code: user.location_code.clone(),
            department_id: user.department_id,
            department_name: user.department_name.clone(),
            login_time: now,
            last_activity: now,
            client,
        }
    }

    /// Seconds of idleness as of `now`.
    pub fn idle_seconds_at(&self, now: i64) -> i64 {
        now - self.last_activity
    }
}

// ============================================================================
// Session Authority
// ============================================================================

/// Lifecycle states of a session handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No login has happened.
    Anonymous,
    /// A live session exists.
    Authenticated,
    /// The session idled past the timeout. Terminal.
    Expired,
    /// The user logged out. Terminal.
    LoggedOut,
}

/// Per-request handle over the optional session.
///
/// Construct one per request: [`SessionAuthority::anonymous`] when no
/// session was presented, [`SessionAuthority::authenticated`] after a
/// successful login or after rehydrating a stored [`Session`].
#[derive(Debug)]
pub struct SessionAuthority {
    session: Option<Session>,
    state: SessionState,
    timeout_secs: i64,
}

impl SessionAuthority {
    /// Handle for a request with no session.
    pub fn anonymous(config: &AuthConfig) -> Self {
        Self {
            session: None,
            state: SessionState::Anonymous,
            timeout_secs: config.timeout_secs(),
        }
    }

    /// Handle wrapping a live session.
    pub fn authenticated(session: Session, config: &AuthConfig) -> Self {
        Self {
            session: Some(session),
            state: SessionState::Authenticated,
            timeout_secs: config.timeout_secs(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The live session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Take the session out of the handle, e.g. to persist it back to
    /// the request layer's session storage at the end of the cycle.
    pub fn into_session(self) -> Option<Session> {
        self.session
    }

    /// True iff a session exists with a set login time.
    pub fn is_logged_in(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.login_time > 0)
            .unwrap_or(false)
    }

    /// Sliding-expiration check against the current wall clock.
    ///
    /// See [`Self::check_timeout_at`].
    pub fn check_timeout(&mut self) -> bool {
        self.check_timeout_at(now_unix())
    }

    /// Sliding-expiration check at an explicit time.
    ///
    /// If more than the configured timeout has passed since the last
    /// checked activity, the session is invalidated (terminal
    /// [`SessionState::Expired`]) and the call returns `false`.
    /// Otherwise `last_activity` advances to `now` and the call returns
    /// `true`. Every authorized check therefore extends the session.
    ///
    /// With no session there is no activity to time out, so the check
    /// passes vacuously; compose with [`Self::is_logged_in`] (or use
    /// [`Self::require_login_at`]) to reject anonymous requests.
    pub fn check_timeout_at(&mut self, now: i64) -> bool {
        let Some(session) = self.session.as_mut() else {
            return true;
        };

        let idle = session.idle_seconds_at(now);
        if idle > self.timeout_secs {
            security_event!(
                SecurityEvent::SessionExpired,
                user_id = session.user_id,
                username = %session.username,
                idle_secs = idle,
                "Session invalidated by idle timeout"
            );
            self.session = None;
            self.state = SessionState::Expired;
            return false;
        }

        session.last_activity = now;
        true
    }

    /// `is_logged_in() && check_timeout()`. On `false` the caller must
    /// deny the request or redirect to login.
    pub fn require_login(&mut self) -> bool {
        self.require_login_at(now_unix())
    }

    /// [`Self::require_login`] at an explicit time.
    pub fn require_login_at(&mut self, now: i64) -> bool {
        self.is_logged_in() && self.check_timeout_at(now)
    }

    /// Explicit logout.
    ///
    /// If a session exists, appends a `logout` audit event (best-effort)
    /// and irreversibly clears the session state (terminal
    /// [`SessionState::LoggedOut`]). With no active session this is a
    /// no-op.
    pub async fn logout<S>(&mut self, sink: &S)
    where
        S: AuditSink + ?Sized,
    {
        if let Some(session) = self.session.take() {
            audit::record(sink, AuditEvent::logout(session.user_id, &session.client)).await;
            security_event!(
                SecurityEvent::Logout,
                user_id = session.user_id,
                username = %session.username,
                "User logged out"
            );
            self.state = SessionState::LoggedOut;
        }
    }

    // ========================================================================
    // Authorization
    // ========================================================================

    /// Role check over the fixed privilege order.
    ///
    /// True iff authenticated and the session's privilege level is at
    /// least the level `required` demands. An unrecognized `required`
    /// name demands the maximum level (see [`Role::required_level`]), so
    /// a misspelled check denies rather than admits.
    pub fn has_role(&self, required: &str) -> bool {
        let Some(session) = self.session.as_ref() else {
            return false;
        };
        session.role.level() >= Role::required_level(required)
    }

    /// Location isolation check.
    ///
    /// Admin and super-admin may access every location; all other roles
    /// only their own.
    pub fn can_access_location(&self, location_id: i64) -> bool {
        let Some(session) = self.session.as_ref() else {
            return false;
        };
        session.role.spans_all_locations() || session.location_id == location_id
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use crate::store::{UserRecord, UserStatus};

    fn user_with_role(role: Role, location_id: i64) -> UserRecord {
        UserRecord {
            user_id: 7,
            employee_id: 70,
            username: "amal".to_string(),
            password_hash: String::new(),
            role,
            login_attempts: 0,
            account_locked: false,
            last_login: None,
            status: UserStatus::Active,
            first_name: "Amal".to_string(),
            last_name: "Haddad".to_string(),
            employee_code: "EMP-0070".to_string(),
            position: "Nurse".to_string(),
            location_id,
            location_name: "Damascus Clinic".to_string(),
            location_code: "SYR".to_string(),
            department_id: 3,
            department_name: "Nursing".to_string(),
        }
    }

    fn authority_at(role: Role, location_id: i64, now: i64) -> SessionAuthority {
        let config = AuthConfig::default();
        let session = Session::from_user(&user_with_role(role, location_id), ClientMeta::unknown(), now);
        SessionAuthority::authenticated(session, &config)
    }

    const T0: i64 = 1_700_000_000;

    #[test]
    fn test_anonymous_is_not_logged_in() {
        let authority = SessionAuthority::anonymous(&AuthConfig::default());
        assert_eq!(authority.state(), SessionState::Anonymous);
        assert!(!authority.is_logged_in());
        assert!(!authority.has_role("employee"));
        assert!(!authority.can_access_location(1));
    }

    #[test]
    fn test_fresh_session_is_authenticated() {
        let authority = authority_at(Role::Employee, 1, T0);
        assert_eq!(authority.state(), SessionState::Authenticated);
        assert!(authority.is_logged_in());
        let session = authority.session().unwrap();
        assert_eq!(session.login_time, T0);
        assert_eq!(session.last_activity, T0);
        assert_eq!(session.full_name, "Amal Haddad");
    }

    #[test]
    fn test_check_within_timeout_advances_activity() {
        // SESSION_TIMEOUT = 3600: a check at +3599 passes and slides the
        // window forward.
        let mut authority = authority_at(Role::Employee, 1, T0);

        assert!(authority.check_timeout_at(T0 + 3599));
        assert_eq!(authority.session().unwrap().last_activity, T0 + 3599);

        // The slide means a check 3599 s after THAT also passes.
        assert!(authority.check_timeout_at(T0 + 3599 + 3599));
        assert!(authority.is_logged_in());
    }

    #[test]
    fn test_check_at_exact_timeout_still_valid() {
        // Valid iff now - last_activity <= TIMEOUT: the boundary itself
        // is still inside the window.
        let mut authority = authority_at(Role::Employee, 1, T0);
        assert!(authority.check_timeout_at(T0 + 3600));
        assert_eq!(authority.state(), SessionState::Authenticated);
    }

    #[test]
    fn test_check_past_timeout_expires_session() {
        let mut authority = authority_at(Role::Employee, 1, T0);

        assert!(!authority.check_timeout_at(T0 + 3601));
        assert_eq!(authority.state(), SessionState::Expired);
        assert!(authority.session().is_none());
        assert!(!authority.is_logged_in());
    }

    #[test]
    fn test_expired_is_terminal() {
        let mut authority = authority_at(Role::Employee, 1, T0);
        assert!(!authority.check_timeout_at(T0 + 4000));

        // No later check resurrects the session.
        assert!(!authority.require_login_at(T0 + 4001));
        assert_eq!(authority.state(), SessionState::Expired);
    }

    #[test]
    fn test_require_login_composes_both_checks() {
        let mut anonymous = SessionAuthority::anonymous(&AuthConfig::default());
        assert!(!anonymous.require_login_at(T0));

        let mut fresh = authority_at(Role::Employee, 1, T0);
        assert!(fresh.require_login_at(T0 + 10));

        let mut stale = authority_at(Role::Employee, 1, T0);
        assert!(!stale.require_login_at(T0 + 3601));
    }

    #[tokio::test]
    async fn test_logout_audits_exactly_once() {
        let sink = MemoryAuditSink::new();
        let mut authority = authority_at(Role::Employee, 1, T0);

        authority.logout(&sink).await;

        assert!(!authority.is_logged_in());
        assert_eq!(authority.state(), SessionState::LoggedOut);
        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "logout");
        assert_eq!(entries[0].user_id, 7);

        // A second logout has no session left and appends nothing.
        authority.logout(&sink).await;
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn test_logout_without_session_is_noop() {
        let sink = MemoryAuditSink::new();
        let mut authority = SessionAuthority::anonymous(&AuthConfig::default());

        authority.logout(&sink).await;

        assert!(sink.is_empty());
        assert_eq!(authority.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_expiry_does_not_write_logout_audit() {
        let sink = MemoryAuditSink::new();
        let mut authority = authority_at(Role::Employee, 1, T0);

        assert!(!authority.check_timeout_at(T0 + 3601));
        // Timeout expiry is a tracing event, not an audit-trail logout.
        assert!(sink.is_empty());

        authority.logout(&sink).await;
        assert!(sink.is_empty());
    }

    #[test]
    fn test_has_role_is_monotone() {
        let admin = authority_at(Role::Admin, 1, T0);
        assert!(admin.has_role("admin"));
        // Anything admin satisfies, every lower role name is satisfied too.
        assert!(admin.has_role("hr_manager"));
        assert!(admin.has_role("department_head"));
        assert!(admin.has_role("employee"));
        assert!(!admin.has_role("super_admin"));

        let employee = authority_at(Role::Employee, 1, T0);
        assert!(employee.has_role("employee"));
        assert!(!employee.has_role("department_head"));
    }

    #[test]
    fn test_has_role_unknown_requirement_denies_below_max() {
        let admin = authority_at(Role::Admin, 1, T0);
        assert!(!admin.has_role("owner"));

        let super_admin = authority_at(Role::SuperAdmin, 1, T0);
        assert!(super_admin.has_role("owner"));
    }

    #[test]
    fn test_can_access_location() {
        for role in [Role::Admin, Role::SuperAdmin] {
            let authority = authority_at(role, 1, T0);
            assert!(authority.can_access_location(1));
            assert!(authority.can_access_location(2));
            assert!(authority.can_access_location(999));
        }

        for role in [Role::Employee, Role::DepartmentHead, Role::HrManager] {
            let authority = authority_at(role, 1, T0);
            assert!(authority.can_access_location(1));
            assert!(!authority.can_access_location(2));
        }
    }

    #[test]
    fn test_authorization_denied_after_expiry() {
        let mut authority = authority_at(Role::SuperAdmin, 1, T0);
        assert!(!authority.check_timeout_at(T0 + 7200));

        assert!(!authority.has_role("employee"));
        assert!(!authority.can_access_location(1));
    }
}
