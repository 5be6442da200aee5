//! Candidate scoring.
//!
//! Produces a 0-100 confidence score for a (ticket, coordinator) pair. The
//! formula is additive: each contribution is a named component, summed and
//! clamped at the end, so individual contributions stay unit-testable.

use serde::Serialize;

use super::config::AllocationConfig;
use super::workload::{effective_max_caseload, Availability, CompanyHistory, WorkloadInfo};
use crate::coordinator::{Coordinator, Specialization};
use crate::ticket::{Ticket, TicketPriority};

/// Reference point for the response-time bonus: 8 hours in minutes.
pub const RESPONSE_TIME_REFERENCE_MINUTES: f64 = 480.0;

/// One named contribution to a candidate's score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreComponent {
    pub label: &'static str,
    pub points: f64,
}

/// Full scoring output for one candidate.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    /// Individual contributions, in evaluation order.
    pub components: Vec<ScoreComponent>,
    /// Human-readable reason fragments for the assignment record.
    pub reasons: Vec<String>,
}

impl ScoreBreakdown {
    /// Final confidence: the component sum rounded and clamped to [0, 100].
    pub fn confidence(&self) -> u32 {
        let sum: f64 = self.components.iter().map(|c| c.points).sum();
        sum.clamp(0.0, 100.0).round() as u32
    }

    /// Joined reason string for audit records.
    pub fn reason(&self) -> String {
        self.reasons.join("; ")
    }
}

/// A coordinator with its score against one ticket.
#[derive(Debug, Clone)]
pub struct ScoredCoordinator {
    pub coordinator: Coordinator,
    pub workload: WorkloadInfo,
    pub history: CompanyHistory,
    pub breakdown: ScoreBreakdown,
    pub confidence: u32,
}

/// Score one coordinator against one ticket.
///
/// Pure function of its inputs: repeated calls with the same state produce
/// the same breakdown.
pub fn score_candidate(
    ticket: &Ticket,
    required_specializations: &[Specialization],
    coordinator: &Coordinator,
    workload: &WorkloadInfo,
    history: &CompanyHistory,
    config: &AllocationConfig,
) -> ScoreBreakdown {
    let mut components = Vec::new();
    let mut reasons = Vec::new();

    // 1. Availability base score.
    let base = match workload.availability {
        Availability::Available => 50.0,
        Availability::Busy => 25.0,
        Availability::Unavailable => 0.0,
    };
    components.push(ScoreComponent {
        label: "availability",
        points: base,
    });
    reasons.push(format!("{} ({} active)", workload.availability.as_str(), workload.active_tickets));

    // 2. Workload-balance bonus: spare capacity scaled by weight.
    let max = effective_max_caseload(coordinator, config);
    let spare = f64::from(max) - f64::from(workload.active_tickets);
    let balance = (spare * 2.0).max(0.0) * config.workload_balance_weight;
    components.push(ScoreComponent {
        label: "workload_balance",
        points: balance,
    });

    // 3. Priority bonus. Urgent tickets handled by a safety-critical
    // coordinator earn the full weight plus the specialization bonus;
    // everyone else gets half weight.
    let weight = config.priority_weights.weight(ticket.priority);
    let priority_points = if ticket.priority == TicketPriority::Urgent
        && coordinator.has_specialization(Specialization::SafetyCritical)
    {
        reasons.push("safety-critical specialist for urgent ticket".to_string());
        weight + config.specialization_bonus
    } else {
        weight * 0.5
    };
    components.push(ScoreComponent {
        label: "priority",
        points: priority_points,
    });

    // 4. Specialization bonus, per matching required specialization.
    let matching: Vec<Specialization> = required_specializations
        .iter()
        .copied()
        .filter(|s| coordinator.has_specialization(*s))
        .collect();
    if !matching.is_empty() {
        components.push(ScoreComponent {
            label: "specializations",
            points: config.specialization_bonus * matching.len() as f64,
        });
        reasons.push(format!(
            "matches {}",
            matching
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    // 5. Company-experience bonus: any prior ticket for this company counts.
    if history.total >= 1 {
        components.push(ScoreComponent {
            label: "company_experience",
            points: config.company_experience_bonus,
        });
        reasons.push(format!(
            "prior experience with company ({} tickets)",
            history.total
        ));
    }

    // 6. Response-time bonus against the 8-hour reference point.
    let response = ((RESPONSE_TIME_REFERENCE_MINUTES - workload.avg_completion_minutes) / 10.0)
        .max(0.0)
        * config.response_time_weight;
    components.push(ScoreComponent {
        label: "response_time",
        points: response,
    });

    ScoreBreakdown {
        components,
        reasons,
    }
}

/// Sort scored candidates into allocation rank order.
///
/// Confidence descending; ties break on ascending coordinator id so repeated
/// runs over the same state rank identically.
pub fn rank_candidates(candidates: &mut [ScoredCoordinator]) {
    candidates.sort_by(|a, b| {
        b.confidence
            .cmp(&a.confidence)
            .then_with(|| a.coordinator.id.cmp(&b.coordinator.id))
    });
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::allocation::workload::DEFAULT_COMPLETION_MINUTES;
    use crate::ticket::TicketStatus;

    fn coordinator(id: &str, specializations: Vec<Specialization>) -> Coordinator {
        Coordinator {
            id: id.to_string(),
            name: id.to_string(),
            active: true,
            archived: false,
            specializations,
            max_caseload: None,
            expertise_rating: 0.0,
            avg_response_minutes: None,
            coordination_capable: None,
        }
    }

    fn workload(coordinator: &Coordinator, active: u32, availability: Availability) -> WorkloadInfo {
        WorkloadInfo {
            coordinator_id: coordinator.id.clone(),
            active_tickets: active,
            high_priority_tickets: 0,
            avg_completion_minutes: DEFAULT_COMPLETION_MINUTES,
            specializations: coordinator.specializations.clone(),
            availability,
        }
    }

    fn ticket(priority: TicketPriority) -> Ticket {
        Ticket {
            id: "t-1".to_string(),
            company_id: "acme".to_string(),
            subject: "case".to_string(),
            priority,
            status: TicketStatus::New,
            required_specializations: vec![],
            assigned_to: None,
            created_at: Utc::now(),
            resolved_at: None,
            updated_at: Utc::now(),
        }
    }

    fn component(breakdown: &ScoreBreakdown, label: &str) -> f64 {
        breakdown
            .components
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.points)
            .unwrap_or(0.0)
    }

    #[test]
    fn availability_base_scores() {
        let config = AllocationConfig::default();
        let c = coordinator("c-1", vec![]);
        let t = ticket(TicketPriority::Medium);

        for (availability, expected) in [
            (Availability::Available, 50.0),
            (Availability::Busy, 25.0),
            (Availability::Unavailable, 0.0),
        ] {
            let w = workload(&c, 0, availability);
            let breakdown =
                score_candidate(&t, &[], &c, &w, &CompanyHistory::default(), &config);
            assert_eq!(component(&breakdown, "availability"), expected);
        }
    }

    #[test]
    fn workload_balance_bonus() {
        let config = AllocationConfig::default();
        let c = coordinator("c-1", vec![]);
        let t = ticket(TicketPriority::Medium);

        // (25 - 10) * 2 * 0.4 = 12
        let w = workload(&c, 10, Availability::Available);
        let breakdown = score_candidate(&t, &[], &c, &w, &CompanyHistory::default(), &config);
        assert!((component(&breakdown, "workload_balance") - 12.0).abs() < 1e-9);

        // No negative bonus above the ceiling.
        let w = workload(&c, 30, Availability::Unavailable);
        let breakdown = score_candidate(&t, &[], &c, &w, &CompanyHistory::default(), &config);
        assert_eq!(component(&breakdown, "workload_balance"), 0.0);
    }

    #[test]
    fn urgent_with_safety_critical_gets_full_weight() {
        let config = AllocationConfig::default();
        let specialist = coordinator("c-1", vec![Specialization::SafetyCritical]);
        let generalist = coordinator("c-2", vec![]);
        let t = ticket(TicketPriority::Urgent);

        let w = workload(&specialist, 0, Availability::Available);
        let specialist_score =
            score_candidate(&t, &[], &specialist, &w, &CompanyHistory::default(), &config);
        // Full urgent weight plus specialization bonus.
        assert_eq!(component(&specialist_score, "priority"), 130.0);

        let w = workload(&generalist, 0, Availability::Available);
        let generalist_score =
            score_candidate(&t, &[], &generalist, &w, &CompanyHistory::default(), &config);
        assert_eq!(component(&generalist_score, "priority"), 50.0);
    }

    #[test]
    fn non_urgent_priorities_earn_half_weight() {
        let config = AllocationConfig::default();
        let c = coordinator("c-1", vec![Specialization::SafetyCritical]);
        let w = workload(&c, 0, Availability::Available);

        for (priority, expected) in [
            (TicketPriority::High, 37.5),
            (TicketPriority::Medium, 25.0),
            (TicketPriority::Low, 12.5),
        ] {
            let t = ticket(priority);
            let breakdown =
                score_candidate(&t, &[], &c, &w, &CompanyHistory::default(), &config);
            assert_eq!(component(&breakdown, "priority"), expected);
        }
    }

    #[test]
    fn specialization_bonus_per_match_uncapped() {
        let config = AllocationConfig::default();
        let c = coordinator(
            "c-1",
            vec![
                Specialization::MentalHealth,
                Specialization::ComplexClaims,
                Specialization::LegalCompliance,
            ],
        );
        let t = ticket(TicketPriority::Low);
        let w = workload(&c, 0, Availability::Available);

        let required = [
            Specialization::MentalHealth,
            Specialization::ComplexClaims,
            Specialization::HighVolume,
        ];
        let breakdown =
            score_candidate(&t, &required, &c, &w, &CompanyHistory::default(), &config);
        // Two matches out of three required.
        assert_eq!(component(&breakdown, "specializations"), 60.0);
    }

    #[test]
    fn company_experience_flat_bonus() {
        let config = AllocationConfig::default();
        let c = coordinator("c-1", vec![]);
        let t = ticket(TicketPriority::Low);
        let w = workload(&c, 0, Availability::Available);

        let with_history = CompanyHistory {
            total: 7,
            active: 2,
        };
        let breakdown = score_candidate(&t, &[], &c, &w, &with_history, &config);
        assert_eq!(component(&breakdown, "company_experience"), 20.0);

        let breakdown = score_candidate(&t, &[], &c, &w, &CompanyHistory::default(), &config);
        assert_eq!(component(&breakdown, "company_experience"), 0.0);
    }

    #[test]
    fn response_time_bonus() {
        let config = AllocationConfig::default();
        let c = coordinator("c-1", vec![]);
        let t = ticket(TicketPriority::Low);

        // (480 - 240) / 10 * 0.3 = 7.2
        let w = workload(&c, 0, Availability::Available);
        let breakdown = score_candidate(&t, &[], &c, &w, &CompanyHistory::default(), &config);
        assert!((component(&breakdown, "response_time") - 7.2).abs() < 1e-9);

        // Slower than the reference point earns nothing.
        let mut slow = workload(&c, 0, Availability::Available);
        slow.avg_completion_minutes = 600.0;
        let breakdown = score_candidate(&t, &[], &c, &slow, &CompanyHistory::default(), &config);
        assert_eq!(component(&breakdown, "response_time"), 0.0);
    }

    #[test]
    fn confidence_clamped_to_100() {
        let config = AllocationConfig::default();
        let c = coordinator("c-1", vec![Specialization::SafetyCritical]);
        let t = ticket(TicketPriority::Urgent);
        let w = workload(&c, 0, Availability::Available);

        let breakdown = score_candidate(
            &t,
            &[Specialization::SafetyCritical],
            &c,
            &w,
            &CompanyHistory { total: 1, active: 0 },
            &config,
        );
        assert_eq!(breakdown.confidence(), 100);
    }

    #[test]
    fn confidence_never_negative() {
        let breakdown = ScoreBreakdown {
            components: vec![ScoreComponent {
                label: "availability",
                points: -10.0,
            }],
            reasons: vec![],
        };
        assert_eq!(breakdown.confidence(), 0);
    }

    #[test]
    fn ranking_ties_break_on_coordinator_id() {
        let config = AllocationConfig::default();
        let t = ticket(TicketPriority::Medium);

        let mut scored: Vec<ScoredCoordinator> = ["c-b", "c-a", "c-c"]
            .iter()
            .map(|id| {
                let c = coordinator(id, vec![]);
                let w = workload(&c, 5, Availability::Available);
                let breakdown =
                    score_candidate(&t, &[], &c, &w, &CompanyHistory::default(), &config);
                let confidence = breakdown.confidence();
                ScoredCoordinator {
                    coordinator: c,
                    workload: w,
                    history: CompanyHistory::default(),
                    breakdown,
                    confidence,
                }
            })
            .collect();

        rank_candidates(&mut scored);
        let order: Vec<&str> = scored.iter().map(|s| s.coordinator.id.as_str()).collect();
        assert_eq!(order, vec!["c-a", "c-b", "c-c"]);
    }
}
