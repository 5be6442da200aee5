//! In-memory test doubles and fixtures.
//!
//! Compiled into the crate so integration tests can use them; nothing here
//! is intended for production wiring.

pub mod fixtures;
mod mock_store;

pub use mock_store::MockTicketStore;
