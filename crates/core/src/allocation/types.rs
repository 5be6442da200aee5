//! Types for the allocation engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::conflict::AllocationConflict;
use crate::coordinator::{DirectoryError, Specialization};
use crate::ticket::{TicketError, TicketPriority};

/// Errors surfaced by `allocate` and `rebalance`.
///
/// Each fatal allocation failure is its own variant so callers can
/// distinguish "needs manual assignment" from transient-retry states.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// The caller requested manual assignment; automation is bypassed.
    #[error("manual assignment required for ticket {0}")]
    ManualOverrideRequired(String),

    /// Ticket not found.
    #[error("ticket not found: {0}")]
    TicketNotFound(String),

    /// The eligible roster is empty.
    #[error("no available coordinators")]
    NoCoordinators,

    /// Every scored candidate carried an exclusionary conflict.
    #[error("no viable coordinators after conflict detection")]
    NoViableCoordinators,

    /// Ticket store error.
    #[error("ticket store error: {0}")]
    TicketStore(#[from] TicketError),

    /// Coordinator directory error.
    #[error("coordinator directory error: {0}")]
    Directory(#[from] DirectoryError),
}

/// Per-call options for `allocate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllocationOptions {
    /// Score the ticket as if it had this priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_override: Option<TicketPriority>,

    /// Override the ticket's required specializations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_specializations: Option<Vec<Specialization>>,

    /// Score company experience against this company instead of the ticket's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_hint: Option<String>,

    /// When true, automation is bypassed and the call fails immediately.
    #[serde(default)]
    pub manual_override: bool,
}

/// Outcome of a successful allocation.
///
/// Consumed by the caller and the audit trail; not persisted here.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationResult {
    pub ticket_id: String,
    pub coordinator_id: String,
    /// Confidence score in [0, 100].
    pub confidence: u32,
    /// Human-readable assignment reason.
    pub reason: String,
    /// Active tickets the coordinator held before this assignment.
    pub workload_before: u32,
    /// Active tickets after: always `workload_before + 1`.
    pub workload_after: u32,
    /// Expected time to completion, from the coordinator's history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_completion_minutes: Option<f64>,
    /// Advisory (non-exclusionary) conflicts noted against the winner.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub advisory_conflicts: Vec<AllocationConflict>,
}

/// One ticket moved during a rebalance run.
#[derive(Debug, Clone, Serialize)]
pub struct RebalanceMove {
    pub ticket_id: String,
    pub from_coordinator: String,
    pub to_coordinator: String,
}

/// Outcome of a rebalance run.
#[derive(Debug, Clone, Serialize)]
pub struct RebalanceReport {
    /// Number of tickets moved (at most the per-run cap).
    pub redistributions: u32,
    /// max(active) - min(active) across the pool before the run.
    pub balance_before: u32,
    /// Same measure after the run.
    pub balance_after: u32,
    /// `balance_before - balance_after`; negative would mean a regression.
    pub balance_improvement: i64,
    /// Every move performed, in order.
    pub moves: Vec<RebalanceMove>,
}
