//! SQLite-backed ticket store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{
    CreateTicketRequest, Ticket, TicketError, TicketFilter, TicketPriority, TicketStatus,
    TicketStore,
};
use crate::coordinator::Specialization;

/// SQLite-backed ticket store.
pub struct SqliteTicketStore {
    conn: Mutex<Connection>,
}

impl SqliteTicketStore {
    /// Create a new SQLite ticket store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, TicketError> {
        let conn = Connection::open(path).map_err(|e| TicketError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite ticket store (useful for testing).
    pub fn in_memory() -> Result<Self, TicketError> {
        let conn =
            Connection::open_in_memory().map_err(|e| TicketError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), TicketError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tickets (
                id TEXT PRIMARY KEY,
                company_id TEXT NOT NULL,
                subject TEXT NOT NULL,
                priority TEXT NOT NULL,
                status TEXT NOT NULL,
                required_specializations TEXT NOT NULL,
                assigned_to TEXT,
                created_at TEXT NOT NULL,
                resolved_at TEXT,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tickets_assigned_to ON tickets(assigned_to);
            CREATE INDEX IF NOT EXISTS idx_tickets_company_id ON tickets(company_id);
            CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
            "#,
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(())
    }

    fn build_where_clause(filter: &TicketFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            conditions.push("status = ?");
            params.push(Box::new(status.as_str().to_string()));
        }

        if let Some(ref company_id) = filter.company_id {
            conditions.push("company_id = ?");
            params.push(Box::new(company_id.clone()));
        }

        if let Some(ref assigned_to) = filter.assigned_to {
            conditions.push("assigned_to = ?");
            params.push(Box::new(assigned_to.clone()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn row_to_ticket(row: &rusqlite::Row) -> rusqlite::Result<Ticket> {
        let id: String = row.get(0)?;
        let company_id: String = row.get(1)?;
        let subject: String = row.get(2)?;
        let priority_str: String = row.get(3)?;
        let status_str: String = row.get(4)?;
        let specializations_json: String = row.get(5)?;
        let assigned_to: Option<String> = row.get(6)?;
        let created_at_str: String = row.get(7)?;
        let resolved_at_str: Option<String> = row.get(8)?;
        let updated_at_str: String = row.get(9)?;

        // Enum columns are stored as their serde snake_case names.
        let priority: TicketPriority =
            serde_json::from_value(serde_json::Value::String(priority_str))
                .unwrap_or(TicketPriority::Medium);
        let status: TicketStatus = serde_json::from_value(serde_json::Value::String(status_str))
            .unwrap_or(TicketStatus::New);

        let required_specializations: Vec<Specialization> =
            serde_json::from_str(&specializations_json).unwrap_or_default();

        let created_at = parse_timestamp(&created_at_str);
        let updated_at = parse_timestamp(&updated_at_str);
        let resolved_at = resolved_at_str.as_deref().map(parse_timestamp);

        Ok(Ticket {
            id,
            company_id,
            subject,
            priority,
            status,
            required_specializations,
            assigned_to,
            created_at,
            resolved_at,
            updated_at,
        })
    }

    fn get_locked(conn: &Connection, id: &str) -> Result<Option<Ticket>, TicketError> {
        let mut stmt = conn
            .prepare(
                "SELECT id, company_id, subject, priority, status, required_specializations, \
                 assigned_to, created_at, resolved_at, updated_at FROM tickets WHERE id = ?",
            )
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let mut rows = stmt
            .query_map(params![id], Self::row_to_ticket)
            .map_err(|e| TicketError::Database(e.to_string()))?;

        match rows.next() {
            Some(Ok(ticket)) => Ok(Some(ticket)),
            Some(Err(e)) => Err(TicketError::Database(e.to_string())),
            None => Ok(None),
        }
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl TicketStore for SqliteTicketStore {
    fn create(&self, request: CreateTicketRequest) -> Result<Ticket, TicketError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        let specializations_json = serde_json::to_string(&request.required_specializations)
            .map_err(|e| TicketError::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO tickets (id, company_id, subject, priority, status, \
             required_specializations, assigned_to, created_at, resolved_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, NULL, ?, NULL, ?)",
            params![
                id,
                request.company_id,
                request.subject,
                request.priority.as_str(),
                TicketStatus::New.as_str(),
                specializations_json,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(Ticket {
            id,
            company_id: request.company_id,
            subject: request.subject,
            priority: request.priority,
            status: TicketStatus::New,
            required_specializations: request.required_specializations,
            assigned_to: None,
            created_at: now,
            resolved_at: None,
            updated_at: now,
        })
    }

    fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError> {
        let conn = self.conn.lock().unwrap();
        Self::get_locked(&conn, id)
    }

    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketError> {
        let conn = self.conn.lock().unwrap();
        let (where_clause, where_params) = Self::build_where_clause(filter);

        let sql = format!(
            "SELECT id, company_id, subject, priority, status, required_specializations, \
             assigned_to, created_at, resolved_at, updated_at FROM tickets {} \
             ORDER BY created_at ASC LIMIT ? OFFSET ?",
            where_clause
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let mut all_params: Vec<&dyn rusqlite::ToSql> =
            where_params.iter().map(|p| p.as_ref()).collect();
        all_params.push(&filter.limit);
        all_params.push(&filter.offset);

        let rows = stmt
            .query_map(all_params.as_slice(), Self::row_to_ticket)
            .map_err(|e| TicketError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| TicketError::Database(e.to_string()))
    }

    fn count(&self, filter: &TicketFilter) -> Result<i64, TicketError> {
        let conn = self.conn.lock().unwrap();
        let (where_clause, where_params) = Self::build_where_clause(filter);

        let sql = format!("SELECT COUNT(*) FROM tickets {}", where_clause);
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let all_params: Vec<&dyn rusqlite::ToSql> =
            where_params.iter().map(|p| p.as_ref()).collect();

        stmt.query_row(all_params.as_slice(), |row| row.get(0))
            .map_err(|e| TicketError::Database(e.to_string()))
    }

    fn tickets_by_assignee(&self, coordinator_id: &str) -> Result<Vec<Ticket>, TicketError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, company_id, subject, priority, status, required_specializations, \
                 assigned_to, created_at, resolved_at, updated_at FROM tickets \
                 WHERE assigned_to = ? ORDER BY created_at ASC",
            )
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![coordinator_id], Self::row_to_ticket)
            .map_err(|e| TicketError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| TicketError::Database(e.to_string()))
    }

    fn update_assignee(
        &self,
        id: &str,
        coordinator_id: Option<&str>,
    ) -> Result<Ticket, TicketError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        let updated = conn
            .execute(
                "UPDATE tickets SET assigned_to = ?, updated_at = ? WHERE id = ?",
                params![coordinator_id, now.to_rfc3339(), id],
            )
            .map_err(|e| TicketError::Database(e.to_string()))?;

        if updated == 0 {
            return Err(TicketError::NotFound(id.to_string()));
        }

        Self::get_locked(&conn, id)?.ok_or_else(|| TicketError::NotFound(id.to_string()))
    }

    fn update_status(&self, id: &str, status: TicketStatus) -> Result<Ticket, TicketError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        let resolved_at = if status.is_terminal() {
            Some(now.to_rfc3339())
        } else {
            None
        };

        let updated = conn
            .execute(
                "UPDATE tickets SET status = ?, resolved_at = ?, updated_at = ? WHERE id = ?",
                params![status.as_str(), resolved_at, now.to_rfc3339(), id],
            )
            .map_err(|e| TicketError::Database(e.to_string()))?;

        if updated == 0 {
            return Err(TicketError::NotFound(id.to_string()));
        }

        Self::get_locked(&conn, id)?.ok_or_else(|| TicketError::NotFound(id.to_string()))
    }
}
