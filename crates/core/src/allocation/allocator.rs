//! The allocator: scores the roster, filters conflicts, commits the winner.

use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use super::config::{AllocationConfig, AllocationConfigUpdate};
use super::conflict::detect_conflicts;
use super::scoring::{rank_candidates, score_candidate, ScoredCoordinator};
use super::types::{AllocationError, AllocationOptions, AllocationResult};
use super::workload::{effective_max_caseload, workload_from_tickets, WorkloadTracker};
use crate::audit::{AuditEvent, AuditHandle};
use crate::coordinator::CoordinatorDirectory;
use crate::ticket::{Ticket, TicketStore};

/// Assigns tickets to coordinators.
///
/// One `allocate` call is a read-score-filter-commit sequence over the
/// ticket's `assigned_to` field. Workload is derived state, so the commit
/// step re-reads the winner's live count under a lock before writing; a
/// candidate that filled up since scoring is skipped for the next survivor.
pub struct Allocator {
    ticket_store: Arc<dyn TicketStore>,
    directory: Arc<dyn CoordinatorDirectory>,
    tracker: WorkloadTracker,
    config: RwLock<AllocationConfig>,
    audit: Option<AuditHandle>,
    commit_lock: tokio::sync::Mutex<()>,
}

impl Allocator {
    /// Create a new allocator.
    pub fn new(
        ticket_store: Arc<dyn TicketStore>,
        directory: Arc<dyn CoordinatorDirectory>,
        config: AllocationConfig,
        audit: Option<AuditHandle>,
    ) -> Self {
        let tracker = WorkloadTracker::new(Arc::clone(&ticket_store));
        Self {
            ticket_store,
            directory,
            tracker,
            config: RwLock::new(config),
            audit,
            commit_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> AllocationConfig {
        self.config.read().unwrap().clone()
    }

    /// Merge a partial configuration update at runtime.
    pub async fn update_config(&self, update: AllocationConfigUpdate) {
        let changes = serde_json::to_string(&update).unwrap_or_default();
        self.config.write().unwrap().apply(update);
        if let Some(audit) = &self.audit {
            audit
                .emit(AuditEvent::AllocationConfigUpdated { changes })
                .await;
        }
    }

    /// Allocate a ticket to the best-suited coordinator.
    pub async fn allocate(
        &self,
        ticket_id: &str,
        options: AllocationOptions,
    ) -> Result<AllocationResult, AllocationError> {
        match self.allocate_inner(ticket_id, &options).await {
            Ok(result) => Ok(result),
            Err(e) => {
                self.emit_failure(ticket_id, &e).await;
                Err(e)
            }
        }
    }

    async fn allocate_inner(
        &self,
        ticket_id: &str,
        options: &AllocationOptions,
    ) -> Result<AllocationResult, AllocationError> {
        // Manual override bypasses automation entirely.
        if options.manual_override {
            return Err(AllocationError::ManualOverrideRequired(
                ticket_id.to_string(),
            ));
        }

        let mut ticket = self
            .ticket_store
            .get(ticket_id)?
            .ok_or_else(|| AllocationError::TicketNotFound(ticket_id.to_string()))?;

        // Apply per-call overrides up front so scoring sees one ticket view.
        if let Some(priority) = options.priority_override {
            ticket.priority = priority;
        }
        if let Some(ref company) = options.company_hint {
            ticket.company_id = company.clone();
        }
        let required_specializations = options
            .required_specializations
            .clone()
            .unwrap_or_else(|| ticket.required_specializations.clone());

        let roster: Vec<_> = self
            .directory
            .all_coordinators()
            .await?
            .into_iter()
            .filter(|c| c.is_eligible())
            .collect();

        if roster.is_empty() {
            return Err(AllocationError::NoCoordinators);
        }

        let config = self.config();

        // Score every eligible coordinator.
        let mut candidates: Vec<ScoredCoordinator> = roster
            .into_iter()
            .map(|coordinator| {
                let workload = self.tracker.snapshot(&coordinator, &config);
                let history = self
                    .tracker
                    .company_history(&coordinator.id, &ticket.company_id);
                let breakdown = score_candidate(
                    &ticket,
                    &required_specializations,
                    &coordinator,
                    &workload,
                    &history,
                    &config,
                );
                let confidence = breakdown.confidence();
                ScoredCoordinator {
                    coordinator,
                    workload,
                    history,
                    breakdown,
                    confidence,
                }
            })
            .collect();

        rank_candidates(&mut candidates);

        // Drop candidates with exclusionary conflicts, preserving rank order.
        let mut survivors = Vec::new();
        for candidate in candidates {
            let conflicts = detect_conflicts(
                &ticket,
                &candidate.coordinator,
                &candidate.workload,
                &candidate.history,
                &config,
            );
            if conflicts.iter().any(|c| c.is_exclusionary()) {
                debug!(
                    ticket_id = %ticket.id,
                    coordinator_id = %candidate.coordinator.id,
                    "candidate excluded by high-severity conflict"
                );
                continue;
            }
            survivors.push((candidate, conflicts));
        }

        if survivors.is_empty() {
            return Err(AllocationError::NoViableCoordinators);
        }

        self.commit(&ticket, options, &config, survivors).await
    }

    /// Commit the top-ranked survivor.
    ///
    /// Serialized across concurrent allocations because the derived caseload
    /// counters race otherwise: each candidate's workload is re-read under
    /// the lock, and a coordinator found at capacity is skipped.
    async fn commit(
        &self,
        ticket: &Ticket,
        options: &AllocationOptions,
        config: &AllocationConfig,
        survivors: Vec<(ScoredCoordinator, Vec<super::conflict::AllocationConflict>)>,
    ) -> Result<AllocationResult, AllocationError> {
        let _guard = self.commit_lock.lock().await;

        for (candidate, conflicts) in survivors {
            let coordinator = &candidate.coordinator;

            // Optimistic re-check against the live ticket state.
            let live = workload_from_tickets(
                coordinator,
                &self.ticket_store.tickets_by_assignee(&coordinator.id)?,
                config,
            );
            let max = effective_max_caseload(coordinator, config);
            if live.active_tickets >= max {
                warn!(
                    ticket_id = %ticket.id,
                    coordinator_id = %coordinator.id,
                    "coordinator reached capacity since scoring, trying next candidate"
                );
                continue;
            }

            let previous_assignee = ticket.assigned_to.clone();
            self.ticket_store
                .update_assignee(&ticket.id, Some(&coordinator.id))?;

            let workload_before = live.active_tickets;
            let workload_after = workload_before + 1;
            let reason = candidate.breakdown.reason();

            info!(
                ticket_id = %ticket.id,
                coordinator_id = %coordinator.id,
                confidence = candidate.confidence,
                workload_before,
                workload_after,
                "ticket assigned"
            );

            if let Some(audit) = &self.audit {
                audit
                    .emit(AuditEvent::TicketAssigned {
                        ticket_id: ticket.id.clone(),
                        coordinator_id: coordinator.id.clone(),
                        confidence: candidate.confidence,
                        reason: reason.clone(),
                        workload_before,
                        workload_after,
                        previous_assignee,
                        request: serde_json::to_string(options).unwrap_or_default(),
                    })
                    .await;
            }

            let advisory_conflicts = conflicts
                .into_iter()
                .filter(|c| !c.is_exclusionary())
                .collect();

            return Ok(AllocationResult {
                ticket_id: ticket.id.clone(),
                coordinator_id: coordinator.id.clone(),
                confidence: candidate.confidence,
                reason,
                workload_before,
                workload_after,
                estimated_completion_minutes: Some(live.avg_completion_minutes),
                advisory_conflicts,
            });
        }

        // Every survivor filled up between scoring and commit.
        Err(AllocationError::NoViableCoordinators)
    }

    async fn emit_failure(&self, ticket_id: &str, error: &AllocationError) {
        let error_kind = match error {
            AllocationError::ManualOverrideRequired(_) => "manual_override_required",
            AllocationError::TicketNotFound(_) => "ticket_not_found",
            AllocationError::NoCoordinators => "no_coordinators",
            AllocationError::NoViableCoordinators => "no_viable_coordinators",
            AllocationError::TicketStore(_) => "ticket_store_error",
            AllocationError::Directory(_) => "directory_error",
        };
        if let Some(audit) = &self.audit {
            audit
                .emit(AuditEvent::AllocationFailed {
                    ticket_id: ticket_id.to_string(),
                    error_kind: error_kind.to_string(),
                    detail: error.to_string(),
                })
                .await;
        }
    }
}
