//! Live workload statistics per coordinator.
//!
//! Caseload is always derived from ticket state rather than stored as a
//! counter, so two reads of the same coordinator can disagree once another
//! allocation commits in between. The allocator re-reads immediately before
//! committing (see `allocator.rs`).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::AllocationConfig;
use crate::coordinator::{Coordinator, Specialization};
use crate::ticket::{Ticket, TicketStore};

/// Default average completion time (minutes) when no history is available.
pub const DEFAULT_COMPLETION_MINUTES: f64 = 240.0;

/// Derived availability bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Busy,
    Unavailable,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Busy => "busy",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Ephemeral workload snapshot for one coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadInfo {
    pub coordinator_id: String,
    /// Count of non-terminal tickets assigned to the coordinator.
    pub active_tickets: u32,
    /// Subset of the above with priority high or urgent.
    pub high_priority_tickets: u32,
    /// Mean resolution time over completed tickets, with fallbacks.
    pub avg_completion_minutes: f64,
    pub specializations: Vec<Specialization>,
    pub availability: Availability,
}

impl WorkloadInfo {
    /// Zero-workload snapshot used when the ticket query fails.
    fn degraded(coordinator: &Coordinator) -> Self {
        Self {
            coordinator_id: coordinator.id.clone(),
            active_tickets: 0,
            high_priority_tickets: 0,
            avg_completion_minutes: coordinator
                .avg_response_minutes
                .unwrap_or(DEFAULT_COMPLETION_MINUTES),
            specializations: coordinator.specializations.clone(),
            availability: Availability::Available,
        }
    }
}

/// A coordinator's history with one company, derived from ticket state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompanyHistory {
    /// Tickets of any status the coordinator has held for the company.
    pub total: u32,
    /// Non-terminal subset.
    pub active: u32,
}

/// The caseload ceiling in effect for a coordinator.
pub fn effective_max_caseload(coordinator: &Coordinator, config: &AllocationConfig) -> u32 {
    coordinator
        .max_caseload
        .unwrap_or(config.max_workload_per_coordinator)
}

/// Availability bucket for an active count against a ceiling.
pub fn availability_for(active: u32, max: u32, threshold_pct: u8) -> Availability {
    if active >= max {
        return Availability::Unavailable;
    }
    let busy_floor = (f64::from(max) * f64::from(threshold_pct) / 100.0).ceil() as u32;
    if active >= busy_floor {
        Availability::Busy
    } else {
        Availability::Available
    }
}

/// Workload snapshot computed from an already-fetched ticket slice.
/// Pure; the store-backed [`WorkloadTracker::snapshot`] wraps this.
pub fn workload_from_tickets(
    coordinator: &Coordinator,
    tickets: &[Ticket],
    config: &AllocationConfig,
) -> WorkloadInfo {
    let active: Vec<&Ticket> = tickets.iter().filter(|t| t.is_active()).collect();
    let active_tickets = active.len() as u32;
    let high_priority_tickets = active
        .iter()
        .filter(|t| t.priority.is_high_priority())
        .count() as u32;

    let completed_minutes: Vec<f64> = tickets
        .iter()
        .filter_map(|t| {
            t.resolved_at
                .map(|resolved| (resolved - t.created_at).num_seconds() as f64 / 60.0)
        })
        .collect();

    let avg_completion_minutes = if completed_minutes.is_empty() {
        coordinator
            .avg_response_minutes
            .unwrap_or(DEFAULT_COMPLETION_MINUTES)
    } else {
        completed_minutes.iter().sum::<f64>() / completed_minutes.len() as f64
    };

    let max = effective_max_caseload(coordinator, config);

    WorkloadInfo {
        coordinator_id: coordinator.id.clone(),
        active_tickets,
        high_priority_tickets,
        avg_completion_minutes,
        specializations: coordinator.specializations.clone(),
        availability: availability_for(active_tickets, max, config.availability_threshold_pct),
    }
}

/// Company history computed from an already-fetched ticket slice.
pub fn company_history_from_tickets(tickets: &[Ticket], company_id: &str) -> CompanyHistory {
    let mut history = CompanyHistory::default();
    for ticket in tickets.iter().filter(|t| t.company_id == company_id) {
        history.total += 1;
        if ticket.is_active() {
            history.active += 1;
        }
    }
    history
}

/// Computes live workload statistics from the ticket store.
#[derive(Clone)]
pub struct WorkloadTracker {
    store: Arc<dyn TicketStore>,
}

impl WorkloadTracker {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    /// Compute a workload snapshot for one coordinator.
    ///
    /// A failed ticket query degrades to a zero-workload `available` snapshot
    /// instead of aborting the whole scoring pass. The degradation is logged;
    /// the coordinator stays in the running with optimistic numbers.
    pub fn snapshot(&self, coordinator: &Coordinator, config: &AllocationConfig) -> WorkloadInfo {
        match self.store.tickets_by_assignee(&coordinator.id) {
            Ok(tickets) => workload_from_tickets(coordinator, &tickets, config),
            Err(e) => {
                warn!(
                    coordinator_id = %coordinator.id,
                    error = %e,
                    "workload query failed, degrading to zero-workload snapshot"
                );
                WorkloadInfo::degraded(coordinator)
            }
        }
    }

    /// Compute a coordinator's history with one company.
    ///
    /// Same degradation policy as [`snapshot`](Self::snapshot): a failed query
    /// yields zero history rather than an error.
    pub fn company_history(&self, coordinator_id: &str, company_id: &str) -> CompanyHistory {
        match self.store.tickets_by_assignee(coordinator_id) {
            Ok(tickets) => company_history_from_tickets(&tickets, company_id),
            Err(e) => {
                warn!(
                    coordinator_id = %coordinator_id,
                    error = %e,
                    "company history query failed, assuming no history"
                );
                CompanyHistory::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::ticket::{TicketPriority, TicketStatus};

    fn coordinator(id: &str) -> Coordinator {
        Coordinator {
            id: id.to_string(),
            name: id.to_string(),
            active: true,
            archived: false,
            specializations: vec![Specialization::GeneralCoordination],
            max_caseload: None,
            expertise_rating: 0.0,
            avg_response_minutes: None,
            coordination_capable: None,
        }
    }

    fn ticket(company: &str, status: TicketStatus, priority: TicketPriority) -> Ticket {
        let created = Utc::now() - Duration::minutes(120);
        Ticket {
            id: uuid::Uuid::new_v4().to_string(),
            company_id: company.to_string(),
            subject: "case".to_string(),
            priority,
            status,
            required_specializations: vec![],
            assigned_to: Some("c-1".to_string()),
            created_at: created,
            resolved_at: status.is_terminal().then(|| created + Duration::minutes(90)),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn counts_exclude_terminal_tickets() {
        let tickets = vec![
            ticket("acme", TicketStatus::New, TicketPriority::Urgent),
            ticket("acme", TicketStatus::InProgress, TicketPriority::Low),
            ticket("acme", TicketStatus::Resolved, TicketPriority::High),
            ticket("acme", TicketStatus::Closed, TicketPriority::Urgent),
        ];

        let info = workload_from_tickets(&coordinator("c-1"), &tickets, &AllocationConfig::default());
        assert_eq!(info.active_tickets, 2);
        assert_eq!(info.high_priority_tickets, 1);
    }

    #[test]
    fn avg_completion_from_resolved_tickets() {
        let tickets = vec![
            ticket("acme", TicketStatus::Resolved, TicketPriority::Low),
            ticket("acme", TicketStatus::Closed, TicketPriority::Low),
        ];

        let info = workload_from_tickets(&coordinator("c-1"), &tickets, &AllocationConfig::default());
        // Both fixtures resolve in 90 minutes.
        assert!((info.avg_completion_minutes - 90.0).abs() < 1.0);
    }

    #[test]
    fn avg_completion_falls_back_to_default() {
        let tickets = vec![ticket("acme", TicketStatus::New, TicketPriority::Low)];
        let info = workload_from_tickets(&coordinator("c-1"), &tickets, &AllocationConfig::default());
        assert_eq!(info.avg_completion_minutes, DEFAULT_COMPLETION_MINUTES);

        let mut with_history = coordinator("c-2");
        with_history.avg_response_minutes = Some(60.0);
        let info = workload_from_tickets(&with_history, &tickets, &AllocationConfig::default());
        assert_eq!(info.avg_completion_minutes, 60.0);
    }

    #[test]
    fn availability_thresholds() {
        // 25-ticket ceiling, busy at 80%.
        assert_eq!(availability_for(0, 25, 80), Availability::Available);
        assert_eq!(availability_for(19, 25, 80), Availability::Available);
        assert_eq!(availability_for(20, 25, 80), Availability::Busy);
        assert_eq!(availability_for(24, 25, 80), Availability::Busy);
        assert_eq!(availability_for(25, 25, 80), Availability::Unavailable);
        assert_eq!(availability_for(30, 25, 80), Availability::Unavailable);
    }

    #[test]
    fn per_coordinator_ceiling_overrides_config() {
        let mut c = coordinator("c-1");
        c.max_caseload = Some(5);
        let config = AllocationConfig::default();
        assert_eq!(effective_max_caseload(&c, &config), 5);

        c.max_caseload = None;
        assert_eq!(effective_max_caseload(&c, &config), 25);
    }

    #[test]
    fn company_history_counts() {
        let tickets = vec![
            ticket("acme", TicketStatus::New, TicketPriority::Low),
            ticket("acme", TicketStatus::Resolved, TicketPriority::Low),
            ticket("globex", TicketStatus::New, TicketPriority::Low),
        ];

        let history = company_history_from_tickets(&tickets, "acme");
        assert_eq!(history.total, 2);
        assert_eq!(history.active, 1);

        let none = company_history_from_tickets(&tickets, "initech");
        assert_eq!(none, CompanyHistory::default());
    }

    #[test]
    fn snapshot_degrades_on_store_failure() {
        use crate::testing::MockTicketStore;

        let store = Arc::new(MockTicketStore::new());
        store.fail_assignee_queries(true);

        let tracker = WorkloadTracker::new(store);
        let info = tracker.snapshot(&coordinator("c-1"), &AllocationConfig::default());

        assert_eq!(info.active_tickets, 0);
        assert_eq!(info.availability, Availability::Available);
        assert_eq!(info.avg_completion_minutes, DEFAULT_COMPLETION_MINUTES);

        let history = tracker.company_history("c-1", "acme");
        assert_eq!(history, CompanyHistory::default());
    }
}
