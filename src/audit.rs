//! Append-only audit trail integration.
//!
//! The audit sink records who did what, from where, and when. Events are
//! immutable once written; this subsystem never updates or deletes them.
//!
//! Writes are best-effort by contract: authentication must not fail
//! because auditing failed. Callers append through [`record`], which
//! logs a sink fault locally and returns; [`AuditError`] never crosses
//! the authenticator boundary.
//!
//! # Usage
//!
//! ```ignore
//! use portcullis::audit::{record, AuditEvent, ClientMeta, MemoryAuditSink};
//!
//! let sink = MemoryAuditSink::new();
//! let client = ClientMeta::new(Some("203.0.113.7".into()), None);
//! record(&sink, AuditEvent::login(42, &client)).await;
//! ```

use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AuditError;
use crate::session::now_unix;

/// Request-context metadata carried into audit records.
///
/// Passed explicitly through the request path rather than read from any
/// process-wide state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMeta {
    /// Client IP address, if the transport layer resolved one.
    pub ip_address: Option<String>,
    /// Client user agent, if supplied.
    pub user_agent: Option<String>,
}

impl ClientMeta {
    /// Metadata with known IP and user agent.
    pub fn new(ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            ip_address,
            user_agent,
        }
    }

    /// Metadata for a request whose origin could not be determined.
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// A single security-relevant action, ready to append to the trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Acting user.
    pub user_id: i64,
    /// Short action verb ("login", "logout").
    pub action: String,
    /// Subsystem the action belongs to.
    pub module: String,
    /// Human-readable description.
    pub description: String,
    /// Client IP at the time of the action.
    pub ip_address: Option<String>,
    /// Client user agent at the time of the action.
    pub user_agent: Option<String>,
    /// Unix timestamp (seconds) when the event was created.
    pub created_at: i64,
}

impl AuditEvent {
    /// Build an event in the authentication module.
    pub fn new(
        user_id: i64,
        action: impl Into<String>,
        description: impl Into<String>,
        client: &ClientMeta,
    ) -> Self {
        Self {
            user_id,
            action: action.into(),
            module: "authentication".to_string(),
            description: description.into(),
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
            created_at: now_unix(),
        }
    }

    /// The event appended on successful login.
    pub fn login(user_id: i64, client: &ClientMeta) -> Self {
        Self::new(user_id, "login", "User logged in successfully", client)
    }

    /// The event appended on explicit logout.
    pub fn logout(user_id: i64, client: &ClientMeta) -> Self {
        Self::new(user_id, "logout", "User logged out", client)
    }
}

/// Append-only sink for audit events.
///
/// Implementations must treat events as immutable: no updates, no
/// deletes.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one event to the trail.
    async fn append(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

/// Append an event, swallowing sink failures.
///
/// A failed write is logged with full detail server-side and otherwise
/// ignored; the caller's flow continues unchanged.
pub async fn record<S>(sink: &S, event: AuditEvent)
where
    S: AuditSink + ?Sized,
{
    if let Err(e) = sink.append(&event).await {
        tracing::warn!(
            action = %event.action,
            user_id = event.user_id,
            error = %e,
            "Failed to append audit event"
        );
    }
}

// ============================================================================
// In-Memory Sink
// ============================================================================

/// In-memory audit sink for single-instance use and tests.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: RwLock<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far, in order.
    pub fn entries(&self) -> Vec<AuditEvent> {
        self.events.read().map(|e| e.clone()).unwrap_or_default()
    }

    /// Number of appended events.
    pub fn len(&self) -> usize {
        self.events.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let mut events = self
            .events
            .write()
            .map_err(|_| AuditError::Sink("audit store lock poisoned".into()))?;
        events.push(event.clone());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Sink that always fails, for exercising the best-effort contract.
    struct BrokenSink;

    #[async_trait]
    impl AuditSink for BrokenSink {
        async fn append(&self, _event: &AuditEvent) -> Result<(), AuditError> {
            Err(AuditError::Sink("disk full".into()))
        }
    }

    #[tokio::test]
    async fn test_memory_sink_appends_in_order() {
        let sink = MemoryAuditSink::new();
        let client = ClientMeta::unknown();

        record(&sink, AuditEvent::login(1, &client)).await;
        record(&sink, AuditEvent::logout(1, &client)).await;

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "login");
        assert_eq!(entries[1].action, "logout");
        assert_eq!(entries[0].module, "authentication");
    }

    #[tokio::test]
    async fn test_record_swallows_sink_failure() {
        let sink = BrokenSink;
        // Must not panic or propagate.
        record(&sink, AuditEvent::login(1, &ClientMeta::unknown())).await;
    }

    #[test]
    fn test_event_carries_client_meta() {
        let client = ClientMeta::new(Some("203.0.113.7".into()), Some("test-agent".into()));
        let event = AuditEvent::login(9, &client);

        assert_eq!(event.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(event.user_agent.as_deref(), Some("test-agent"));
        assert_eq!(event.description, "User logged in successfully");
        assert!(event.created_at > 0);
    }
}
