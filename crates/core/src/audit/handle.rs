use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use super::AuditEvent;

/// Envelope wrapping an audit event with metadata
#[derive(Debug, Clone)]
pub struct AuditEventEnvelope {
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
}

/// Handle for emitting audit events
///
/// This is cheaply cloneable and can be shared across tasks.
/// Events are sent through an async channel to be written by the AuditWriter.
/// Emission is best-effort: a full or closed channel is logged and the caller
/// never fails, so a committed assignment is never rolled back over auditing.
#[derive(Clone)]
pub struct AuditHandle {
    tx: mpsc::Sender<AuditEventEnvelope>,
}

impl AuditHandle {
    /// Create a new audit handle from a channel sender
    pub fn new(tx: mpsc::Sender<AuditEventEnvelope>) -> Self {
        Self { tx }
    }

    /// Emit an audit event asynchronously
    pub async fn emit(&self, event: AuditEvent) {
        let envelope = AuditEventEnvelope {
            timestamp: Utc::now(),
            event,
        };
        if let Err(e) = self.tx.send(envelope).await {
            tracing::error!("Failed to emit audit event: {}", e);
        }
    }

    /// Try to emit an audit event without blocking
    ///
    /// Returns true if the event was sent successfully, false otherwise.
    pub fn try_emit(&self, event: AuditEvent) -> bool {
        let envelope = AuditEventEnvelope {
            timestamp: Utc::now(),
            event,
        };
        match self.tx.try_send(envelope) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to emit audit event: {}", e);
                false
            }
        }
    }
}
