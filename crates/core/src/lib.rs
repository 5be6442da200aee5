//! Core engine for occupational-health case coordination: assigns support
//! tickets to the best-suited coordinator and keeps caseloads balanced.
//!
//! The public surface is the [`allocation::Allocator`] (score, filter,
//! commit, audit) and the [`allocation::Rebalancer`] (bounded greedy
//! redistribution), backed by pluggable [`ticket::TicketStore`] and
//! [`coordinator::CoordinatorDirectory`] implementations and an async audit
//! pipeline under [`audit`].

pub mod allocation;
pub mod audit;
pub mod config;
pub mod coordinator;
pub mod testing;
pub mod ticket;

pub use allocation::{
    AllocationConfig, AllocationError, AllocationOptions, AllocationResult, Allocator,
    RebalanceReport, Rebalancer,
};
pub use config::{load_config, load_config_from_str, Config, ConfigError};
