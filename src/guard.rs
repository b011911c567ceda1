//! Request guards for axum handlers.
//!
//! Thin adapters between the session authority and HTTP: a failed check
//! becomes a redirect (for browser-facing pages) or a JSON error
//! response (for API routes). The guards carry their redirect targets
//! explicitly so handlers read like the flow they implement.
//!
//! # Usage
//!
//! ```ignore
//! use portcullis::guard::{self, DEFAULT_DENIED_REDIRECT};
//!
//! async fn dashboard(mut authority: SessionAuthority) -> Result<Html<String>, Redirect> {
//!     guard::require_login(&mut authority, "/login")?;
//!     let session = authority.session().unwrap();
//!     Ok(render_dashboard(session))
//! }
//!
//! async fn payroll_admin(mut authority: SessionAuthority) -> Result<Html<String>, Redirect> {
//!     guard::require_role(&mut authority, "hr_manager", DEFAULT_DENIED_REDIRECT)?;
//!     // ...
//! }
//! ```

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;

use crate::events::SecurityEvent;
use crate::security_event;
use crate::session::SessionAuthority;

/// Where an unauthenticated request is sent.
pub const DEFAULT_LOGIN_REDIRECT: &str = "/login";

/// Where an underprivileged request is sent.
pub const DEFAULT_DENIED_REDIRECT: &str = "/unauthorized";

/// Redirect unless a live, unexpired session exists.
///
/// Runs the sliding-timeout check, so a passing call extends the
/// session.
pub fn require_login(
    authority: &mut SessionAuthority,
    redirect_to: &str,
) -> Result<(), Redirect> {
    if authority.require_login() {
        Ok(())
    } else {
        Err(Redirect::to(redirect_to))
    }
}

/// Redirect unless the session satisfies `required`.
///
/// Composes [`require_login`] (sending unauthenticated requests to
/// [`DEFAULT_LOGIN_REDIRECT`]) with the role check, and logs the access
/// decision either way.
pub fn require_role(
    authority: &mut SessionAuthority,
    required: &str,
    redirect_to: &str,
) -> Result<(), Redirect> {
    require_login(authority, DEFAULT_LOGIN_REDIRECT)?;

    // require_login passed, so a session exists.
    let allowed = authority.has_role(required);
    let session = authority.session();
    let user_id = session.map(|s| s.user_id).unwrap_or(0);
    let role = session.map(|s| s.role.as_str()).unwrap_or("-");

    if allowed {
        security_event!(
            SecurityEvent::AccessGranted,
            user_id = user_id,
            role = role,
            required = %required,
            "Role check passed"
        );
        Ok(())
    } else {
        security_event!(
            SecurityEvent::AccessDenied,
            user_id = user_id,
            role = role,
            required = %required,
            "Role check failed"
        );
        Err(Redirect::to(redirect_to))
    }
}

/// 401 JSON response for API routes when the session is missing or
/// expired.
pub fn session_expired_response() -> Response {
    let body = json!({
        "error": "session_expired",
        "message": "Your session has expired. Please sign in again."
    });

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Session")],
        Json(body),
    )
        .into_response()
}

/// 403 JSON response for API routes when the role check fails.
pub fn forbidden_response() -> Response {
    let body = json!({
        "error": "forbidden",
        "message": "You do not have permission to access this resource."
    });

    (StatusCode::FORBIDDEN, Json(body)).into_response()
}
