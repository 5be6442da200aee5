//! Prebuilt domain values for tests.

use chrono::Utc;

use crate::coordinator::{Coordinator, Specialization};
use crate::ticket::{Ticket, TicketPriority, TicketStatus};

/// An active, eligible coordinator with the given specializations and
/// otherwise default attributes.
pub fn coordinator(id: &str, specializations: Vec<Specialization>) -> Coordinator {
    Coordinator {
        id: id.to_string(),
        name: format!("Coordinator {}", id),
        active: true,
        archived: false,
        specializations,
        max_caseload: None,
        expertise_rating: 3.5,
        avg_response_minutes: None,
        coordination_capable: None,
    }
}

/// A fresh unassigned ticket for the given company.
pub fn ticket(company_id: &str, priority: TicketPriority) -> Ticket {
    let now = Utc::now();
    Ticket {
        id: uuid::Uuid::new_v4().to_string(),
        company_id: company_id.to_string(),
        subject: "workplace health case".to_string(),
        priority,
        status: TicketStatus::New,
        required_specializations: Vec::new(),
        assigned_to: None,
        created_at: now,
        resolved_at: None,
        updated_at: now,
    }
}
