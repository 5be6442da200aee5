//! Conflict detection for (ticket, coordinator) pairs.
//!
//! Conflicts come in three severities. Only `High` disqualifies a candidate;
//! medium and low conflicts ride along on the result as advisories.

use serde::{Deserialize, Serialize};

use super::config::AllocationConfig;
use super::workload::{effective_max_caseload, CompanyHistory, WorkloadInfo};
use crate::coordinator::{Coordinator, Specialization};
use crate::ticket::{Ticket, TicketPriority};

/// Active same-company tickets a coordinator may hold before a company
/// conflict is flagged.
pub const COMPANY_CONFLICT_THRESHOLD: u32 = 3;

/// Conflict taxonomy.
///
/// `AvailabilityConflict` is reserved: nothing emits it today, but consumers
/// of serialized conflicts should accept it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    WorkloadOverload,
    SpecializationMismatch,
    CompanyConflict,
    AvailabilityConflict,
}

impl ConflictType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorkloadOverload => "workload_overload",
            Self::SpecializationMismatch => "specialization_mismatch",
            Self::CompanyConflict => "company_conflict",
            Self::AvailabilityConflict => "availability_conflict",
        }
    }
}

/// Conflict severity. Only `High` is exclusionary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
}

/// A detected condition against assigning a ticket to a coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConflict {
    pub conflict_type: ConflictType,
    pub severity: ConflictSeverity,
    pub description: String,
    pub coordinator_id: String,
}

impl AllocationConflict {
    /// High-severity conflicts remove the candidate from consideration.
    pub fn is_exclusionary(&self) -> bool {
        self.severity == ConflictSeverity::High
    }
}

/// Detect conflicts for one (ticket, coordinator) pair.
pub fn detect_conflicts(
    ticket: &Ticket,
    coordinator: &Coordinator,
    workload: &WorkloadInfo,
    history: &CompanyHistory,
    config: &AllocationConfig,
) -> Vec<AllocationConflict> {
    let mut conflicts = Vec::new();

    let max = effective_max_caseload(coordinator, config);
    if workload.active_tickets >= max {
        conflicts.push(AllocationConflict {
            conflict_type: ConflictType::WorkloadOverload,
            severity: ConflictSeverity::High,
            description: format!(
                "at capacity: {} of {} active tickets",
                workload.active_tickets, max
            ),
            coordinator_id: coordinator.id.clone(),
        });
    }

    if ticket.priority == TicketPriority::Urgent
        && !coordinator.has_specialization(Specialization::SafetyCritical)
        && !coordinator.has_specialization(Specialization::OccupationalHealth)
    {
        conflicts.push(AllocationConflict {
            conflict_type: ConflictType::SpecializationMismatch,
            severity: ConflictSeverity::Medium,
            description:
                "urgent ticket without safety_critical or occupational_health specialization"
                    .to_string(),
            coordinator_id: coordinator.id.clone(),
        });
    }

    if history.active > COMPANY_CONFLICT_THRESHOLD {
        conflicts.push(AllocationConflict {
            conflict_type: ConflictType::CompanyConflict,
            severity: ConflictSeverity::Low,
            description: format!(
                "already holds {} active tickets for company {}",
                history.active, ticket.company_id
            ),
            coordinator_id: coordinator.id.clone(),
        });
    }

    conflicts
}
