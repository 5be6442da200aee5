//! Coordinator data types.

use serde::{Deserialize, Serialize};

/// Coordinator specialization tags.
///
/// A closed set: capability is expressed by membership here rather than by
/// free-form permission objects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Specialization {
    GeneralCoordination,
    OccupationalHealth,
    LegalCompliance,
    ComplexClaims,
    MentalHealth,
    SafetyCritical,
    HighVolume,
    CompanySpecialist,
}

impl Specialization {
    /// Returns the specialization as a string for storage and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeneralCoordination => "general_coordination",
            Self::OccupationalHealth => "occupational_health",
            Self::LegalCompliance => "legal_compliance",
            Self::ComplexClaims => "complex_claims",
            Self::MentalHealth => "mental_health",
            Self::SafetyCritical => "safety_critical",
            Self::HighVolume => "high_volume",
            Self::CompanySpecialist => "company_specialist",
        }
    }
}

/// A human agent eligible to be assigned tickets.
///
/// Owned by an external directory; this subsystem only reads coordinator
/// attributes. Current caseload is always derived from ticket state, never
/// stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coordinator {
    /// Unique identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Whether the coordinator is currently active.
    pub active: bool,

    /// Whether the coordinator has been archived.
    #[serde(default)]
    pub archived: bool,

    /// Specializations the coordinator holds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specializations: Vec<Specialization>,

    /// Personal caseload ceiling. Falls back to the configured pool-wide
    /// ceiling when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_caseload: Option<u32>,

    /// Expertise rating (directory-owned, informational).
    #[serde(default)]
    pub expertise_rating: f64,

    /// Historical average response time in minutes, if the directory tracks it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_response_minutes: Option<f64>,

    /// Whether the coordinator may take coordination duty. Unset means yes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordination_capable: Option<bool>,
}

impl Coordinator {
    /// Capability flag with its documented default: unset means capable.
    pub fn is_coordination_capable(&self) -> bool {
        self.coordination_capable.unwrap_or(true)
    }

    /// Whether the coordinator may appear in an allocation roster.
    pub fn is_eligible(&self) -> bool {
        self.active && !self.archived && self.is_coordination_capable()
    }

    /// Whether the coordinator holds the given specialization.
    pub fn has_specialization(&self, specialization: Specialization) -> bool {
        self.specializations.contains(&specialization)
    }
}
