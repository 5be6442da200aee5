//! Bounded greedy redistribution of tickets across the coordinator pool.

use std::sync::Arc;

use tracing::{debug, info};

use super::config::AllocationConfig;
use super::types::{AllocationError, RebalanceMove, RebalanceReport};
use super::workload::{effective_max_caseload, WorkloadTracker};
use crate::audit::{AuditEvent, AuditHandle};
use crate::coordinator::{Coordinator, CoordinatorDirectory};
use crate::ticket::TicketStore;

/// Hard cap on moves per run, bounding the blast radius of one invocation.
pub const MAX_MOVES_PER_RUN: usize = 10;

/// A coordinator counts as overloaded above this fraction of its ceiling.
const OVERLOAD_FACTOR: f64 = 0.8;

/// A coordinator counts as underloaded below this fraction of its ceiling.
const UNDERLOAD_FACTOR: f64 = 0.6;

struct PoolEntry {
    coordinator: Coordinator,
    active: u32,
    max: u32,
}

impl PoolEntry {
    fn is_overloaded(&self) -> bool {
        f64::from(self.active) > OVERLOAD_FACTOR * f64::from(self.max)
    }

    fn is_underloaded(&self) -> bool {
        f64::from(self.active) < UNDERLOAD_FACTOR * f64::from(self.max)
    }
}

/// Redistributes tickets from overloaded to underloaded coordinators.
///
/// Greedy and deliberately non-optimal: each run makes a bounded number of
/// incremental moves rather than solving for a global optimum, so any single
/// invocation stays cheap and auditable.
pub struct Rebalancer {
    ticket_store: Arc<dyn TicketStore>,
    directory: Arc<dyn CoordinatorDirectory>,
    tracker: WorkloadTracker,
    config: AllocationConfig,
    audit: Option<AuditHandle>,
}

impl Rebalancer {
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
            config,
            audit,
        }
    }

    /// Run one rebalance pass over the whole coordinator pool.
    ///
    /// Only transferable tickets move: status `new` and priority below
    /// urgent. Moves stop for a pair once the overloaded side is within two
    /// tickets of the underloaded side, and globally at
    /// [`MAX_MOVES_PER_RUN`].
    pub async fn rebalance(&self) -> Result<RebalanceReport, AllocationError> {
        let mut pool: Vec<PoolEntry> = self
            .directory
            .all_coordinators()
            .await?
            .into_iter()
            .filter(|c| c.is_eligible())
            .map(|coordinator| {
                let workload = self.tracker.snapshot(&coordinator, &self.config);
                let max = effective_max_caseload(&coordinator, &self.config);
                PoolEntry {
                    coordinator,
                    active: workload.active_tickets,
                    max,
                }
            })
            .collect();

        let balance_before = spread(&pool);

        // Indices rather than partitioned vectors, so the in-memory counters
        // stay in one place while both sides mutate.
        let overloaded: Vec<usize> = (0..pool.len())
            .filter(|&i| pool[i].is_overloaded())
            .collect();
        let underloaded: Vec<usize> = (0..pool.len())
            .filter(|&i| pool[i].is_underloaded())
            .collect();

        let mut moves = Vec::new();

        'pairs: for &over in &overloaded {
            // One fetch per overloaded coordinator; pop as tickets move away.
            let mut transferable: Vec<_> = self
                .ticket_store
                .tickets_by_assignee(&pool[over].coordinator.id)?
                .into_iter()
                .filter(|t| t.is_transferable())
                .collect();

            for &under in &underloaded {
                while pool[over].active > pool[under].active + 2 {
                    if moves.len() >= MAX_MOVES_PER_RUN {
                        break 'pairs;
                    }
                    let Some(ticket) = transferable.pop() else {
                        debug!(
                            coordinator_id = %pool[over].coordinator.id,
                            "no transferable tickets left, skipping remaining pairs"
                        );
                        continue 'pairs;
                    };

                    let from = pool[over].coordinator.id.clone();
                    let to = pool[under].coordinator.id.clone();
                    self.ticket_store.update_assignee(&ticket.id, Some(&to))?;
                    pool[over].active -= 1;
                    pool[under].active += 1;

                    info!(
                        ticket_id = %ticket.id,
                        from_coordinator = %from,
                        to_coordinator = %to,
                        "ticket moved during rebalance"
                    );

                    if let Some(audit) = &self.audit {
                        audit
                            .emit(AuditEvent::TicketReassigned {
                                ticket_id: ticket.id.clone(),
                                from_coordinator: from.clone(),
                                to_coordinator: to.clone(),
                                reason: "workload rebalance".to_string(),
                            })
                            .await;
                    }

                    moves.push(RebalanceMove {
                        ticket_id: ticket.id,
                        from_coordinator: from,
                        to_coordinator: to,
                    });
                }
            }
        }

        let balance_after = spread(&pool);
        let report = RebalanceReport {
            redistributions: moves.len() as u32,
            balance_before,
            balance_after,
            balance_improvement: i64::from(balance_before) - i64::from(balance_after),
            moves,
        };

        info!(
            redistributions = report.redistributions,
            balance_before = report.balance_before,
            balance_after = report.balance_after,
            "rebalance run complete"
        );

        if let Some(audit) = &self.audit {
            audit
                .emit(AuditEvent::RebalanceCompleted {
                    redistributions: report.redistributions,
                    balance_before: report.balance_before,
                    balance_after: report.balance_after,
                })
                .await;
        }

        Ok(report)
    }
}

/// Workload spread: max(active) - min(active) across the pool.
fn spread(pool: &[PoolEntry]) -> u32 {
    let max = pool.iter().map(|e| e.active).max().unwrap_or(0);
    let min = pool.iter().map(|e| e.active).min().unwrap_or(0);
    max - min
}
