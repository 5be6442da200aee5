//! Allocation configuration.

use serde::{Deserialize, Serialize};

use crate::ticket::TicketPriority;

/// Base score weights per ticket priority.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriorityWeights {
    #[serde(default = "default_urgent_weight")]
    pub urgent: f64,
    #[serde(default = "default_high_weight")]
    pub high: f64,
    #[serde(default = "default_medium_weight")]
    pub medium: f64,
    #[serde(default = "default_low_weight")]
    pub low: f64,
}

impl PriorityWeights {
    /// Weight for the given priority.
    pub fn weight(&self, priority: TicketPriority) -> f64 {
        match priority {
            TicketPriority::Urgent => self.urgent,
            TicketPriority::High => self.high,
            TicketPriority::Medium => self.medium,
            TicketPriority::Low => self.low,
        }
    }
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            urgent: default_urgent_weight(),
            high: default_high_weight(),
            medium: default_medium_weight(),
            low: default_low_weight(),
        }
    }
}

fn default_urgent_weight() -> f64 {
    100.0
}

fn default_high_weight() -> f64 {
    75.0
}

fn default_medium_weight() -> f64 {
    50.0
}

fn default_low_weight() -> f64 {
    25.0
}

/// Configuration for the allocation scorer and conflict detector.
///
/// Immutable during a single `allocate` call: the allocator snapshots it once
/// per call, so scoring stays a pure function of its inputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationConfig {
    /// Active-ticket ceiling before a coordinator is `unavailable`.
    /// Per-coordinator `max_caseload` overrides this when set.
    #[serde(default = "default_max_workload")]
    pub max_workload_per_coordinator: u32,

    /// Base priority score weights.
    #[serde(default)]
    pub priority_weights: PriorityWeights,

    /// Bonus per matching required specialization.
    #[serde(default = "default_specialization_bonus")]
    pub specialization_bonus: f64,

    /// Flat bonus when the coordinator has handled the company before.
    #[serde(default = "default_company_experience_bonus")]
    pub company_experience_bonus: f64,

    /// Scales the spare-capacity bonus.
    #[serde(default = "default_workload_balance_weight")]
    pub workload_balance_weight: f64,

    /// Scales the response-time bonus.
    #[serde(default = "default_response_time_weight")]
    pub response_time_weight: f64,

    /// Percentage of the ceiling at which a coordinator counts as `busy`.
    #[serde(default = "default_availability_threshold")]
    pub availability_threshold_pct: u8,
}

fn default_max_workload() -> u32 {
    25
}

fn default_specialization_bonus() -> f64 {
    30.0
}

fn default_company_experience_bonus() -> f64 {
    20.0
}

fn default_workload_balance_weight() -> f64 {
    0.4
}

fn default_response_time_weight() -> f64 {
    0.3
}

fn default_availability_threshold() -> u8 {
    80
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            max_workload_per_coordinator: default_max_workload(),
            priority_weights: PriorityWeights::default(),
            specialization_bonus: default_specialization_bonus(),
            company_experience_bonus: default_company_experience_bonus(),
            workload_balance_weight: default_workload_balance_weight(),
            response_time_weight: default_response_time_weight(),
            availability_threshold_pct: default_availability_threshold(),
        }
    }
}

impl AllocationConfig {
    /// Merge a partial update into this config, field by field.
    pub fn apply(&mut self, update: AllocationConfigUpdate) {
        if let Some(v) = update.max_workload_per_coordinator {
            self.max_workload_per_coordinator = v;
        }
        if let Some(v) = update.priority_weights {
            self.priority_weights = v;
        }
        if let Some(v) = update.specialization_bonus {
            self.specialization_bonus = v;
        }
        if let Some(v) = update.company_experience_bonus {
            self.company_experience_bonus = v;
        }
        if let Some(v) = update.workload_balance_weight {
            self.workload_balance_weight = v;
        }
        if let Some(v) = update.response_time_weight {
            self.response_time_weight = v;
        }
        if let Some(v) = update.availability_threshold_pct {
            self.availability_threshold_pct = v;
        }
    }
}

/// Partial update to [`AllocationConfig`]. Unset fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllocationConfigUpdate {
    pub max_workload_per_coordinator: Option<u32>,
    pub priority_weights: Option<PriorityWeights>,
    pub specialization_bonus: Option<f64>,
    pub company_experience_bonus: Option<f64>,
    pub workload_balance_weight: Option<f64>,
    pub response_time_weight: Option<f64>,
    pub availability_threshold_pct: Option<u8>,
}
