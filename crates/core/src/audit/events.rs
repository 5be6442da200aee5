use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit event types emitted by the allocation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A ticket was assigned to a coordinator by the allocator.
    TicketAssigned {
        ticket_id: String,
        coordinator_id: String,
        /// Confidence score (0-100) behind the decision.
        confidence: u32,
        /// Human-readable assignment reason.
        reason: String,
        /// Active tickets the coordinator held before the assignment.
        workload_before: u32,
        /// Active tickets after the assignment.
        workload_after: u32,
        /// Assignee the ticket was taken from, when re-allocating.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous_assignee: Option<String>,
        /// The original request, serialized for replay/debugging.
        request: String,
    },

    /// An allocation attempt failed with a fatal error.
    AllocationFailed {
        ticket_id: String,
        /// The distinguishable error kind, e.g. "no_viable_coordinators".
        error_kind: String,
        detail: String,
    },

    /// A ticket was moved between coordinators by the rebalancer.
    TicketReassigned {
        ticket_id: String,
        from_coordinator: String,
        to_coordinator: String,
        reason: String,
    },

    /// A rebalance run finished.
    RebalanceCompleted {
        redistributions: u32,
        balance_before: u32,
        balance_after: u32,
    },

    /// The allocation configuration was updated at runtime.
    AllocationConfigUpdated {
        /// The fields that changed, serialized.
        changes: String,
    },
}

impl AuditEvent {
    /// Returns the event type as a string for storage
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::TicketAssigned { .. } => "ticket_assigned",
            Self::AllocationFailed { .. } => "allocation_failed",
            Self::TicketReassigned { .. } => "ticket_reassigned",
            Self::RebalanceCompleted { .. } => "rebalance_completed",
            Self::AllocationConfigUpdated { .. } => "allocation_config_updated",
        }
    }

    /// Extract ticket_id if this event is ticket-related
    pub fn ticket_id(&self) -> Option<&str> {
        match self {
            Self::TicketAssigned { ticket_id, .. }
            | Self::AllocationFailed { ticket_id, .. }
            | Self::TicketReassigned { ticket_id, .. } => Some(ticket_id),
            _ => None,
        }
    }

    /// Extract the coordinator the event concerns, if any
    pub fn coordinator_id(&self) -> Option<&str> {
        match self {
            Self::TicketAssigned { coordinator_id, .. } => Some(coordinator_id),
            Self::TicketReassigned { to_coordinator, .. } => Some(to_coordinator),
            _ => None,
        }
    }
}

/// A stored audit record with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub ticket_id: Option<String>,
    pub coordinator_id: Option<String>,
    pub data: AuditEvent,
}
