//! Coordinator directory trait and a static in-memory implementation.

use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;

use super::Coordinator;

/// Error type for directory lookups.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Backend failure (network, database, etc).
    #[error("directory backend error: {0}")]
    Backend(String),
}

/// Read access to the coordinator roster.
///
/// The roster is owned externally (typically an HR or staffing system), so
/// the trait is async. Implementations return a (possibly empty) roster or a
/// typed error, never a silently coerced empty result.
#[async_trait]
pub trait CoordinatorDirectory: Send + Sync {
    /// All coordinators known to the directory, including inactive ones.
    /// Eligibility filtering is the caller's concern.
    async fn all_coordinators(&self) -> Result<Vec<Coordinator>, DirectoryError>;

    /// Look up a single coordinator by ID.
    async fn get(&self, id: &str) -> Result<Option<Coordinator>, DirectoryError>;
}

/// In-memory directory backed by a fixed roster.
///
/// Suitable for small deployments where the roster is loaded at startup, and
/// for tests.
pub struct StaticDirectory {
    coordinators: RwLock<Vec<Coordinator>>,
}

impl StaticDirectory {
    /// Create a directory from a fixed roster.
    pub fn new(coordinators: Vec<Coordinator>) -> Self {
        Self {
            coordinators: RwLock::new(coordinators),
        }
    }

    /// Replace the roster wholesale.
    pub fn replace(&self, coordinators: Vec<Coordinator>) {
        *self.coordinators.write().unwrap() = coordinators;
    }
}

#[async_trait]
impl CoordinatorDirectory for StaticDirectory {
    async fn all_coordinators(&self) -> Result<Vec<Coordinator>, DirectoryError> {
        Ok(self.coordinators.read().unwrap().clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Coordinator>, DirectoryError> {
        Ok(self
            .coordinators
            .read()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator(id: &str) -> Coordinator {
        Coordinator {
            id: id.to_string(),
            name: format!("Coordinator {}", id),
            active: true,
            archived: false,
            specializations: vec![],
            max_caseload: None,
            expertise_rating: 0.0,
            avg_response_minutes: None,
            coordination_capable: None,
        }
    }

    #[tokio::test]
    async fn returns_full_roster() {
        let dir = StaticDirectory::new(vec![coordinator("c-1"), coordinator("c-2")]);
        assert_eq!(dir.all_coordinators().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn get_by_id() {
        let dir = StaticDirectory::new(vec![coordinator("c-1")]);
        assert!(dir.get("c-1").await.unwrap().is_some());
        assert!(dir.get("c-9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_swaps_roster() {
        let dir = StaticDirectory::new(vec![coordinator("c-1")]);
        dir.replace(vec![coordinator("c-2"), coordinator("c-3")]);

        assert!(dir.get("c-1").await.unwrap().is_none());
        assert_eq!(dir.all_coordinators().await.unwrap().len(), 2);
    }
}
