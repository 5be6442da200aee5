//! Ticket storage trait and request/filter types.

use thiserror::Error;

use crate::coordinator::Specialization;
use crate::ticket::{Ticket, TicketPriority, TicketStatus};

/// Error type for ticket operations.
#[derive(Debug, Error)]
pub enum TicketError {
    /// Ticket not found.
    #[error("ticket not found: {0}")]
    NotFound(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

/// Request to create a new ticket.
#[derive(Debug, Clone)]
pub struct CreateTicketRequest {
    /// Company the ticket belongs to.
    pub company_id: String,
    /// Short human-readable summary.
    pub subject: String,
    /// Intake priority.
    pub priority: TicketPriority,
    /// Specializations this ticket calls for.
    pub required_specializations: Vec<Specialization>,
}

/// Filter for querying tickets.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    /// Filter by lifecycle state.
    pub status: Option<TicketStatus>,
    /// Filter by company.
    pub company_id: Option<String>,
    /// Filter by assignee.
    pub assigned_to: Option<String>,
    /// Maximum number of results.
    pub limit: i64,
    /// Offset for pagination.
    pub offset: i64,
}

impl TicketFilter {
    /// Create a new filter with defaults.
    pub fn new() -> Self {
        Self {
            limit: 100,
            offset: 0,
            ..Default::default()
        }
    }

    /// Filter by lifecycle state.
    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filter by company.
    pub fn with_company_id(mut self, company_id: impl Into<String>) -> Self {
        self.company_id = Some(company_id.into());
        self
    }

    /// Filter by assignee.
    pub fn with_assigned_to(mut self, coordinator_id: impl Into<String>) -> Self {
        self.assigned_to = Some(coordinator_id.into());
        self
    }

    /// Set limit.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Set offset.
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Trait for ticket storage backends.
///
/// Implementations must surface backend failures as [`TicketError`]s rather
/// than coercing them to empty results; callers decide how to degrade.
pub trait TicketStore: Send + Sync {
    /// Create a new ticket in the `New` state, unassigned.
    fn create(&self, request: CreateTicketRequest) -> Result<Ticket, TicketError>;

    /// Get a ticket by ID.
    fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError>;

    /// List tickets matching the filter.
    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketError>;

    /// Count tickets matching the filter.
    fn count(&self, filter: &TicketFilter) -> Result<i64, TicketError>;

    /// All tickets (any status) currently or previously assigned to a coordinator.
    fn tickets_by_assignee(&self, coordinator_id: &str) -> Result<Vec<Ticket>, TicketError>;

    /// Update a ticket's assignee. `None` unassigns.
    fn update_assignee(
        &self,
        id: &str,
        coordinator_id: Option<&str>,
    ) -> Result<Ticket, TicketError>;

    /// Update a ticket's lifecycle state. Terminal transitions stamp `resolved_at`.
    fn update_status(&self, id: &str, status: TicketStatus) -> Result<Ticket, TicketError>;
}
