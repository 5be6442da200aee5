//! Ticket-to-coordinator allocation: workload tracking, candidate scoring,
//! conflict detection, assignment, and pool rebalancing.

mod allocator;
mod config;
mod conflict;
mod rebalance;
mod scoring;
mod types;
mod workload;

pub use allocator::Allocator;
pub use config::{AllocationConfig, AllocationConfigUpdate, PriorityWeights};
pub use conflict::{
    detect_conflicts, AllocationConflict, ConflictSeverity, ConflictType,
    COMPANY_CONFLICT_THRESHOLD,
};
pub use rebalance::{Rebalancer, MAX_MOVES_PER_RUN};
pub use scoring::{
    rank_candidates, score_candidate, ScoreBreakdown, ScoreComponent, ScoredCoordinator,
    RESPONSE_TIME_REFERENCE_MINUTES,
};
pub use types::{
    AllocationError, AllocationOptions, AllocationResult, RebalanceMove, RebalanceReport,
};
pub use workload::{
    availability_for, company_history_from_tickets, effective_max_caseload,
    workload_from_tickets, Availability, CompanyHistory, WorkloadInfo, WorkloadTracker,
    DEFAULT_COMPLETION_MINUTES,
};
