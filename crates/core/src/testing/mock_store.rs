use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use chrono::Utc;

use crate::ticket::{
    CreateTicketRequest, Ticket, TicketError, TicketFilter, TicketPriority, TicketStatus,
    TicketStore,
};

/// In-memory ticket store with failure injection.
///
/// Iteration order is insertion order, so tests stay deterministic.
#[derive(Default)]
pub struct MockTicketStore {
    tickets: Mutex<Vec<Ticket>>,
    fail_assignee: AtomicBool,
    fail_assignee_remaining: AtomicU32,
    fail_updates: AtomicBool,
}

impl MockTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `tickets_by_assignee` call fail until turned off again.
    pub fn fail_assignee_queries(&self, fail: bool) {
        self.fail_assignee.store(fail, Ordering::SeqCst);
    }

    /// Make only the next `n` `tickets_by_assignee` calls fail.
    pub fn fail_assignee_queries_times(&self, n: u32) {
        self.fail_assignee_remaining.store(n, Ordering::SeqCst);
    }

    /// Make every `update_assignee`/`update_status` call fail.
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Insert a prebuilt ticket as-is and return it.
    pub fn insert_ticket(&self, ticket: Ticket) -> Ticket {
        self.tickets.lock().unwrap().push(ticket.clone());
        ticket
    }

    /// Insert `n` tickets of the given status assigned to a coordinator.
    pub fn seed_assigned_tickets(
        &self,
        assignee: &str,
        company_id: &str,
        n: usize,
        status: TicketStatus,
    ) {
        let mut tickets = self.tickets.lock().unwrap();
        for _ in 0..n {
            let now = Utc::now();
            tickets.push(Ticket {
                id: uuid::Uuid::new_v4().to_string(),
                company_id: company_id.to_string(),
                subject: "seeded case".to_string(),
                priority: TicketPriority::Medium,
                status,
                required_specializations: Vec::new(),
                assigned_to: Some(assignee.to_string()),
                created_at: now,
                resolved_at: status.is_terminal().then_some(now),
                updated_at: now,
            });
        }
    }

    fn assignee_query_allowed(&self) -> Result<(), TicketError> {
        if self.fail_assignee.load(Ordering::SeqCst) {
            return Err(TicketError::Database("injected query failure".to_string()));
        }
        // Consume one shot from the bounded counter, if armed.
        let remaining = self.fail_assignee_remaining.load(Ordering::SeqCst);
        if remaining > 0
            && self
                .fail_assignee_remaining
                .compare_exchange(remaining, remaining - 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        {
            return Err(TicketError::Database("injected query failure".to_string()));
        }
        Ok(())
    }

    fn matches(ticket: &Ticket, filter: &TicketFilter) -> bool {
        if let Some(status) = filter.status {
            if ticket.status != status {
                return false;
            }
        }
        if let Some(ref company_id) = filter.company_id {
            if &ticket.company_id != company_id {
                return false;
            }
        }
        if let Some(ref assigned_to) = filter.assigned_to {
            if ticket.assigned_to.as_deref() != Some(assigned_to.as_str()) {
                return false;
            }
        }
        true
    }
}

impl TicketStore for MockTicketStore {
    fn create(&self, request: CreateTicketRequest) -> Result<Ticket, TicketError> {
        let now = Utc::now();
        let ticket = Ticket {
            id: uuid::Uuid::new_v4().to_string(),
            company_id: request.company_id,
            subject: request.subject,
            priority: request.priority,
            status: TicketStatus::New,
            required_specializations: request.required_specializations,
            assigned_to: None,
            created_at: now,
            resolved_at: None,
            updated_at: now,
        };
        Ok(self.insert_ticket(ticket))
    }

    fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError> {
        Ok(self
            .tickets
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketError> {
        Ok(self
            .tickets
            .lock()
            .unwrap()
            .iter()
            .filter(|t| Self::matches(t, filter))
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .cloned()
            .collect())
    }

    fn count(&self, filter: &TicketFilter) -> Result<i64, TicketError> {
        Ok(self
            .tickets
            .lock()
            .unwrap()
            .iter()
            .filter(|t| Self::matches(t, filter))
            .count() as i64)
    }

    fn tickets_by_assignee(&self, coordinator_id: &str) -> Result<Vec<Ticket>, TicketError> {
        self.assignee_query_allowed()?;
        Ok(self
            .tickets
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.assigned_to.as_deref() == Some(coordinator_id))
            .cloned()
            .collect())
    }

    fn update_assignee(
        &self,
        id: &str,
        coordinator_id: Option<&str>,
    ) -> Result<Ticket, TicketError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(TicketError::Database("injected update failure".to_string()));
        }
        let mut tickets = self.tickets.lock().unwrap();
        let ticket = tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TicketError::NotFound(id.to_string()))?;
        ticket.assigned_to = coordinator_id.map(String::from);
        ticket.updated_at = Utc::now();
        Ok(ticket.clone())
    }

    fn update_status(&self, id: &str, status: TicketStatus) -> Result<Ticket, TicketError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(TicketError::Database("injected update failure".to_string()));
        }
        let mut tickets = self.tickets.lock().unwrap();
        let ticket = tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TicketError::NotFound(id.to_string()))?;
        ticket.status = status;
        ticket.resolved_at = status.is_terminal().then(Utc::now);
        ticket.updated_at = Utc::now();
        Ok(ticket.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_get() {
        let store = MockTicketStore::new();
        let ticket = store
            .create(CreateTicketRequest {
                company_id: "acme".to_string(),
                subject: "noise exposure review".to_string(),
                priority: TicketPriority::High,
                required_specializations: vec![],
            })
            .unwrap();

        let found = store.get(&ticket.id).unwrap().unwrap();
        assert_eq!(found.status, TicketStatus::New);
        assert!(found.assigned_to.is_none());
    }

    #[test]
    fn list_filters_and_paginates() {
        let store = MockTicketStore::new();
        store.seed_assigned_tickets("c-1", "acme", 3, TicketStatus::InProgress);
        store.seed_assigned_tickets("c-2", "globex", 2, TicketStatus::New);

        let filter = TicketFilter::new().with_assigned_to("c-1");
        assert_eq!(store.list(&filter).unwrap().len(), 3);
        assert_eq!(store.count(&filter).unwrap(), 3);

        let page = TicketFilter::new().with_assigned_to("c-1").with_limit(2);
        assert_eq!(store.list(&page).unwrap().len(), 2);
    }

    #[test]
    fn bounded_failure_injection_expires() {
        let store = MockTicketStore::new();
        store.fail_assignee_queries_times(1);

        assert!(store.tickets_by_assignee("c-1").is_err());
        assert!(store.tickets_by_assignee("c-1").is_ok());
    }

    #[test]
    fn update_status_stamps_resolved_at() {
        let store = MockTicketStore::new();
        store.seed_assigned_tickets("c-1", "acme", 1, TicketStatus::InProgress);
        let id = store.tickets_by_assignee("c-1").unwrap()[0].id.clone();

        let closed = store.update_status(&id, TicketStatus::Closed).unwrap();
        assert!(closed.resolved_at.is_some());

        let reopened = store.update_status(&id, TicketStatus::InProgress).unwrap();
        assert!(reopened.resolved_at.is_none());
    }
}
