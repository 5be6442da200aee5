//! Rebalance integration tests over the SQLite ticket store.

use std::sync::Arc;

use tempfile::TempDir;

use caseflow_core::{
    allocation::{AllocationConfig, Rebalancer, MAX_MOVES_PER_RUN},
    audit::{create_audit_system, AuditFilter, AuditStore, SqliteAuditStore},
    coordinator::{Coordinator, CoordinatorDirectory, StaticDirectory},
    testing::fixtures,
    ticket::{CreateTicketRequest, SqliteTicketStore, TicketPriority, TicketStatus, TicketStore},
};

struct TestHarness {
    ticket_store: Arc<SqliteTicketStore>,
    audit_store: Arc<SqliteAuditStore>,
    directory: Arc<StaticDirectory>,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new(roster: Vec<Coordinator>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("caseflow.db");

        let ticket_store =
            Arc::new(SqliteTicketStore::new(&db_path).expect("Failed to create ticket store"));
        let audit_store =
            Arc::new(SqliteAuditStore::new(&db_path).expect("Failed to create audit store"));
        let directory = Arc::new(StaticDirectory::new(roster));

        Self {
            ticket_store,
            audit_store,
            directory,
            _temp_dir: temp_dir,
        }
    }

    fn rebalancer(&self) -> (Rebalancer, tokio::task::JoinHandle<()>) {
        let (handle, writer) = create_audit_system(
            Arc::clone(&self.audit_store) as Arc<dyn AuditStore>,
            64,
        );
        let writer_task = tokio::spawn(writer.run());
        let rebalancer = Rebalancer::new(
            Arc::clone(&self.ticket_store) as Arc<dyn TicketStore>,
            Arc::clone(&self.directory) as Arc<dyn CoordinatorDirectory>,
            AllocationConfig::default(),
            Some(handle),
        );
        (rebalancer, writer_task)
    }

    /// Assign `n` tickets of the given status and priority to a coordinator.
    fn seed(&self, coordinator_id: &str, n: usize, status: TicketStatus, priority: TicketPriority) {
        for _ in 0..n {
            let ticket = self
                .ticket_store
                .create(CreateTicketRequest {
                    company_id: "acme".to_string(),
                    subject: "workplace health case".to_string(),
                    priority,
                    required_specializations: vec![],
                })
                .expect("Failed to create ticket");
            self.ticket_store
                .update_assignee(&ticket.id, Some(coordinator_id))
                .expect("Failed to assign");
            if status != TicketStatus::New {
                self.ticket_store
                    .update_status(&ticket.id, status)
                    .expect("Failed to update status");
            }
        }
    }

    fn active_count(&self, coordinator_id: &str) -> usize {
        self.ticket_store
            .tickets_by_assignee(coordinator_id)
            .unwrap()
            .iter()
            .filter(|t| t.is_active())
            .count()
    }
}

#[tokio::test]
async fn moves_transferable_tickets_until_loads_converge() {
    let harness = TestHarness::new(vec![
        fixtures::coordinator("c-over", vec![]),
        fixtures::coordinator("c-under", vec![]),
    ]);
    // 22 active on c-over, 5 of them transferable; 10 active on c-under.
    harness.seed("c-over", 17, TicketStatus::InProgress, TicketPriority::Medium);
    harness.seed("c-over", 5, TicketStatus::New, TicketPriority::Medium);
    harness.seed("c-under", 10, TicketStatus::InProgress, TicketPriority::Medium);

    let (rebalancer, writer_task) = harness.rebalancer();
    let report = rebalancer.rebalance().await.unwrap();

    // 22/10 converges to 17/15 in five moves.
    assert_eq!(report.redistributions, 5);
    assert_eq!(report.balance_before, 12);
    assert_eq!(report.balance_after, 2);
    assert_eq!(report.balance_improvement, 10);

    assert_eq!(harness.active_count("c-over"), 17);
    assert_eq!(harness.active_count("c-under"), 15);

    drop(rebalancer);
    writer_task.await.unwrap();

    let reassignments = harness
        .audit_store
        .query(&AuditFilter::new().with_event_type("ticket_reassigned"))
        .unwrap();
    assert_eq!(reassignments.len(), 5);

    let completions = harness
        .audit_store
        .query(&AuditFilter::new().with_event_type("rebalance_completed"))
        .unwrap();
    assert_eq!(completions.len(), 1);
}

#[tokio::test]
async fn never_moves_more_than_the_cap_in_one_run() {
    let harness = TestHarness::new(vec![
        fixtures::coordinator("c-over", vec![]),
        fixtures::coordinator("c-idle", vec![]),
    ]);
    // A large transferable backlog: far more than one run may move.
    harness.seed("c-over", 24, TicketStatus::New, TicketPriority::Medium);

    let (rebalancer, writer_task) = harness.rebalancer();
    let report = rebalancer.rebalance().await.unwrap();

    assert_eq!(report.redistributions as usize, MAX_MOVES_PER_RUN);
    assert_eq!(report.moves.len(), MAX_MOVES_PER_RUN);
    assert_eq!(harness.active_count("c-idle"), MAX_MOVES_PER_RUN);

    drop(rebalancer);
    writer_task.await.unwrap();
}

#[tokio::test]
async fn urgent_and_worked_tickets_stay_put() {
    let harness = TestHarness::new(vec![
        fixtures::coordinator("c-over", vec![]),
        fixtures::coordinator("c-under", vec![]),
    ]);
    // Overloaded, but nothing is transferable: urgent or already worked.
    harness.seed("c-over", 17, TicketStatus::InProgress, TicketPriority::Medium);
    harness.seed("c-over", 5, TicketStatus::New, TicketPriority::Urgent);
    harness.seed("c-under", 2, TicketStatus::InProgress, TicketPriority::Medium);

    let (rebalancer, writer_task) = harness.rebalancer();
    let report = rebalancer.rebalance().await.unwrap();

    assert_eq!(report.redistributions, 0);
    assert_eq!(harness.active_count("c-over"), 22);
    assert_eq!(harness.active_count("c-under"), 2);

    drop(rebalancer);
    writer_task.await.unwrap();
}

#[tokio::test]
async fn a_balanced_pool_reports_zero_improvement() {
    let harness = TestHarness::new(vec![
        fixtures::coordinator("c-1", vec![]),
        fixtures::coordinator("c-2", vec![]),
    ]);
    harness.seed("c-1", 8, TicketStatus::InProgress, TicketPriority::Medium);
    harness.seed("c-2", 9, TicketStatus::InProgress, TicketPriority::Medium);

    let (rebalancer, writer_task) = harness.rebalancer();
    let report = rebalancer.rebalance().await.unwrap();

    assert_eq!(report.redistributions, 0);
    assert_eq!(report.balance_before, 1);
    assert_eq!(report.balance_improvement, 0);
    assert!(report.moves.is_empty());

    drop(rebalancer);
    writer_task.await.unwrap();
}
