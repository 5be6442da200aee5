//! Ticket system for tracking case coordination work items.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteTicketStore;
pub use store::{CreateTicketRequest, TicketError, TicketFilter, TicketStore};
pub use types::{Ticket, TicketPriority, TicketStatus};
