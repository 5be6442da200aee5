//! Coordinator roster types and directory access.

mod directory;
mod types;

pub use directory::{CoordinatorDirectory, DirectoryError, StaticDirectory};
pub use types::{Coordinator, Specialization};
