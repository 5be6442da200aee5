//! Core ticket data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coordinator::Specialization;

/// Ticket priority as assessed at intake.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    /// Returns the priority as a string for storage and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    /// High and urgent tickets count toward a coordinator's high-priority load.
    pub fn is_high_priority(&self) -> bool {
        matches!(self, Self::High | Self::Urgent)
    }
}

/// Ticket lifecycle state.
///
/// `Complete`, `Closed` and `Resolved` are terminal; tickets in those states
/// no longer count toward a coordinator's workload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Freshly created or freshly assigned, not yet worked.
    New,
    InProgress,
    OnHold,
    Complete,
    Closed,
    Resolved,
}

impl TicketStatus {
    /// Returns the status as a string for storage and filtering.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::OnHold => "on_hold",
            Self::Complete => "complete",
            Self::Closed => "closed",
            Self::Resolved => "resolved",
        }
    }

    /// Whether this state ends the ticket's lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Closed | Self::Resolved)
    }
}

/// A unit of coordination work requiring assignment to exactly one coordinator.
///
/// Tickets are created externally; this subsystem mutates only `assigned_to`
/// (the allocator and rebalancer) and never deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier (UUID).
    pub id: String,

    /// Company/organization the ticket belongs to.
    pub company_id: String,

    /// Short human-readable summary.
    pub subject: String,

    /// Current priority.
    pub priority: TicketPriority,

    /// Current lifecycle state.
    pub status: TicketStatus,

    /// Specializations this ticket calls for (may be empty).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_specializations: Vec<Specialization>,

    /// Coordinator currently responsible, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    /// When the ticket was created.
    pub created_at: DateTime<Utc>,

    /// When the ticket reached a terminal state, if it has.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Whether the ticket still counts toward its assignee's workload.
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Whether the rebalancer may move this ticket to another coordinator.
    ///
    /// Only freshly assigned, non-urgent tickets are transferable.
    pub fn is_transferable(&self) -> bool {
        self.status == TicketStatus::New && self.priority != TicketPriority::Urgent
    }
}
