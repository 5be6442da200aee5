use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::allocation::AllocationConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub allocation: AllocationConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("caseflow.db")
}

/// Audit pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditConfig {
    /// Channel buffer between emitters and the writer task.
    #[serde(default = "default_audit_buffer")]
    pub buffer_size: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_audit_buffer(),
        }
    }
}

fn default_audit_buffer() -> usize {
    256
}
