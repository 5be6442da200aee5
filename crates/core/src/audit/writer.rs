use std::sync::Arc;

use tokio::sync::mpsc;

use super::{AuditEventEnvelope, AuditHandle, AuditRecord, AuditStore};

/// Background task that receives audit events and writes them to storage
pub struct AuditWriter {
    rx: mpsc::Receiver<AuditEventEnvelope>,
    store: Arc<dyn AuditStore>,
}

impl AuditWriter {
    /// Create a new audit writer
    pub fn new(rx: mpsc::Receiver<AuditEventEnvelope>, store: Arc<dyn AuditStore>) -> Self {
        Self { rx, store }
    }

    /// Run the writer, consuming events until the channel is closed
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        tracing::info!("Audit writer started");

        while let Some(envelope) = self.rx.recv().await {
            let record = AuditRecord {
                id: 0, // Will be set by database
                timestamp: envelope.timestamp,
                event_type: envelope.event.event_type().to_string(),
                ticket_id: envelope.event.ticket_id().map(String::from),
                coordinator_id: envelope.event.coordinator_id().map(String::from),
                data: envelope.event,
            };

            if let Err(e) = self.store.insert(&record) {
                tracing::error!("Failed to write audit event: {}", e);
            }
        }

        tracing::info!("Audit writer shutting down");
    }
}

/// Create a complete audit system
///
/// Returns:
/// - `AuditHandle` - for emitting events (clone this to share across tasks)
/// - `AuditWriter` - spawn this as a background task with `tokio::spawn(writer.run())`
///
/// # Arguments
/// * `store` - The audit store to write events to
/// * `buffer_size` - Size of the channel buffer (events will block if full)
pub fn create_audit_system(
    store: Arc<dyn AuditStore>,
    buffer_size: usize,
) -> (AuditHandle, AuditWriter) {
    let (tx, rx) = mpsc::channel(buffer_size);
    let handle = AuditHandle::new(tx);
    let writer = AuditWriter::new(rx, store);
    (handle, writer)
}
