//! Feasibility rules over a finished proposal.
//!
//! Pure and side-effect free: the verdict is recomputed on every read and
//! never persisted. A verdict can only be feasible when every rule evaluated
//! cleanly and found nothing, so evaluation problems surface as reasons
//! rather than silently passing.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::extraction::heuristics::parse_flexible_date;
use crate::profile::schema::ProviderProfile;
use crate::proposal::schema::ProposalDocument;

/// How many uncovered requirement ids a single reason cites.
const MAX_CITED_REQUIREMENTS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct FeasibilityVerdict {
    pub feasible: bool,
    pub reasons: Vec<String>,
}

/// Assesses `proposal` against the client overview and the provider profile
/// at the current time.
pub fn assess(
    proposal: &ProposalDocument,
    profile: &ProviderProfile,
    overview: &Value,
) -> FeasibilityVerdict {
    assess_at(proposal, profile, overview, Utc::now())
}

/// Clock-pinned variant; [`assess`] delegates here with `Utc::now()`.
pub fn assess_at(
    proposal: &ProposalDocument,
    profile: &ProviderProfile,
    overview: &Value,
    now: DateTime<Utc>,
) -> FeasibilityVerdict {
    let mut reasons = Vec::new();

    check_budget(proposal, overview, &mut reasons);
    check_timeline(proposal, overview, now, &mut reasons);
    check_coverage(proposal, &mut reasons);
    check_capabilities(proposal, profile, &mut reasons);

    FeasibilityVerdict {
        feasible: reasons.is_empty(),
        reasons,
    }
}

/// Rule 1: total cost within the client budget. Evaluated only when both
/// figures are present and positive; a budget that does not parse as a
/// number skips the rule.
fn check_budget(proposal: &ProposalDocument, overview: &Value, reasons: &mut Vec<String>) {
    let budget = overview
        .get("budget")
        .and_then(numeric)
        .or_else(|| overview.get("budgetAmount").and_then(numeric));
    let total_cost = proposal.pricing_and_commercials.total_cost;

    if let Some(budget) = budget {
        if budget > 0.0 && total_cost > 0.0 && total_cost > budget {
            reasons.push(format!(
                "Estimated total cost ({total_cost}) exceeds client budget ({budget})."
            ));
        }
    }
}

/// Rule 2: proposed duration fits before the client deadline. A deadline
/// that is present but unparseable cannot be evaluated and fails closed
/// with its own reason.
fn check_timeline(
    proposal: &ProposalDocument,
    overview: &Value,
    now: DateTime<Utc>,
    reasons: &mut Vec<String>,
) {
    let duration_months = proposal.delivery_plan.total_duration_months;
    if duration_months <= 0.0 {
        return;
    }
    let deadline_raw = match overview.get("deadline").and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.trim(),
        _ => return,
    };

    let Some(deadline) = parse_flexible_date(deadline_raw) else {
        reasons.push(format!(
            "Feasibility check could not evaluate the timeline: unparseable deadline '{deadline_raw}'."
        ));
        return;
    };

    let months_remaining = months_between(now, deadline).max(0);
    if duration_months > months_remaining as f64 {
        reasons.push(format!(
            "Proposed delivery duration ({duration_months} months) exceeds time available until client deadline ({months_remaining} months)."
        ));
    }
}

/// Rule 3: requirements the mapping marks as not covered or not supported.
fn check_coverage(proposal: &ProposalDocument, reasons: &mut Vec<String>) {
    let ids: Vec<&str> = proposal
        .requirement_mapping
        .iter()
        .filter(|entry| {
            let status = entry.status.to_lowercase();
            status.contains("not covered")
                || status.contains("not supported")
                || status == "not_covered"
                || status == "not_supported"
        })
        .map(|entry| {
            if entry.requirement_id.is_empty() {
                entry.description.as_str()
            } else {
                entry.requirement_id.as_str()
            }
        })
        .take(MAX_CITED_REQUIREMENTS)
        .collect();

    if !ids.is_empty() {
        reasons.push(format!(
            "Some requirements are not covered by provider: {}.",
            ids.join(", ")
        ));
    }
}

/// Rule 4 (best effort): every mapped service should resemble a declared
/// service. The match is a bidirectional case-insensitive substring test,
/// so it can flag naming mismatches a human would read as equivalent; the
/// single generic reason reflects that advisory grade. Skipped entirely
/// when the profile declares no services.
fn check_capabilities(
    proposal: &ProposalDocument,
    profile: &ProviderProfile,
    reasons: &mut Vec<String>,
) {
    if profile.services.is_empty() {
        return;
    }
    let declared: Vec<String> = profile.services.keys().map(|k| k.to_lowercase()).collect();

    let unsupported = proposal.requirement_mapping.iter().any(|entry| {
        let mapped = entry.mapped_service.to_lowercase();
        if mapped.is_empty() {
            return false;
        }
        !declared
            .iter()
            .any(|service| service.contains(&mapped) || mapped.contains(service))
    });

    if unsupported {
        reasons.push(
            "Mapped services include items not present in provider's declared services."
                .to_string(),
        );
    }
}

/// Whole calendar months between two instants, year and month components
/// only. Can be negative when `to` is in the past.
fn months_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// Numeric field access tolerant of numbers carried as strings.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::schema::{sanitize, RequirementMappingEntry};
    use chrono::TimeZone;
    use serde_json::json;

    fn proposal_with(raw: Value) -> ProposalDocument {
        sanitize(&raw)
    }

    fn profile_with_services(names: &[&str]) -> ProviderProfile {
        let mut profile = ProviderProfile::default();
        for name in names {
            profile.services.insert(name.to_string(), true);
        }
        profile
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_cost_over_budget_is_infeasible_with_both_figures() {
        let proposal = proposal_with(json!({
            "pricing_and_commercials": { "total_cost": 120000 }
        }));
        let verdict = assess_at(
            &proposal,
            &ProviderProfile::default(),
            &json!({ "budget": 100000 }),
            fixed_now(),
        );

        assert!(!verdict.feasible);
        assert_eq!(verdict.reasons.len(), 1);
        assert!(verdict.reasons[0].contains("120000"));
        assert!(verdict.reasons[0].contains("100000"));
    }

    #[test]
    fn test_cost_within_budget_is_feasible() {
        let proposal = proposal_with(json!({
            "pricing_and_commercials": { "total_cost": 80000 }
        }));
        let verdict = assess_at(
            &proposal,
            &ProviderProfile::default(),
            &json!({ "budget": 100000 }),
            fixed_now(),
        );

        assert!(verdict.feasible);
        assert!(verdict.reasons.is_empty());
    }

    #[test]
    fn test_budget_accepts_numeric_strings_and_fallback_key() {
        let proposal = proposal_with(json!({
            "pricing_and_commercials": { "total_cost": 50000 }
        }));
        let verdict = assess_at(
            &proposal,
            &ProviderProfile::default(),
            &json!({ "budgetAmount": "40000" }),
            fixed_now(),
        );
        assert!(!verdict.feasible);
    }

    #[test]
    fn test_non_numeric_budget_skips_the_rule() {
        let proposal = proposal_with(json!({
            "pricing_and_commercials": { "total_cost": 50000 }
        }));
        let verdict = assess_at(
            &proposal,
            &ProviderProfile::default(),
            &json!({ "budget": "to be discussed" }),
            fixed_now(),
        );
        assert!(verdict.feasible);
    }

    #[test]
    fn test_duration_beyond_deadline_is_infeasible() {
        let proposal = proposal_with(json!({
            "delivery_plan": { "total_duration_months": 8 }
        }));
        // 2026-01-15 → 2026-05-01 is 4 calendar months.
        let verdict = assess_at(
            &proposal,
            &ProviderProfile::default(),
            &json!({ "deadline": "2026-05-01" }),
            fixed_now(),
        );

        assert!(!verdict.feasible);
        assert!(verdict.reasons[0].contains("8 months"));
        assert!(verdict.reasons[0].contains("4 months"));
    }

    #[test]
    fn test_duration_within_deadline_is_feasible() {
        let proposal = proposal_with(json!({
            "delivery_plan": { "total_duration_months": 3 }
        }));
        let verdict = assess_at(
            &proposal,
            &ProviderProfile::default(),
            &json!({ "deadline": "2026-05-01" }),
            fixed_now(),
        );
        assert!(verdict.feasible);
    }

    #[test]
    fn test_past_deadline_floors_at_zero_months() {
        let proposal = proposal_with(json!({
            "delivery_plan": { "total_duration_months": 1 }
        }));
        let verdict = assess_at(
            &proposal,
            &ProviderProfile::default(),
            &json!({ "deadline": "2025-06-01" }),
            fixed_now(),
        );

        assert!(!verdict.feasible);
        assert!(verdict.reasons[0].contains("(0 months)"));
    }

    #[test]
    fn test_unparseable_deadline_fails_closed() {
        let proposal = proposal_with(json!({
            "delivery_plan": { "total_duration_months": 2 }
        }));
        let verdict = assess_at(
            &proposal,
            &ProviderProfile::default(),
            &json!({ "deadline": "whenever works" }),
            fixed_now(),
        );

        assert!(!verdict.feasible);
        assert!(verdict.reasons[0].contains("unparseable deadline"));
        assert!(verdict.reasons[0].contains("whenever works"));
    }

    #[test]
    fn test_deadline_without_duration_skips_the_rule() {
        let proposal = proposal_with(json!({}));
        let verdict = assess_at(
            &proposal,
            &ProviderProfile::default(),
            &json!({ "deadline": "not even a date" }),
            fixed_now(),
        );
        assert!(verdict.feasible);
    }

    #[test]
    fn test_not_covered_status_is_case_insensitive() {
        let proposal = proposal_with(json!({
            "requirement_mapping": [
                { "requirement_id": "REQ-03", "status": "NOT COVERED" },
                { "requirement_id": "REQ-04", "status": "not_supported" }
            ]
        }));
        let verdict = assess_at(
            &proposal,
            &ProviderProfile::default(),
            &json!({}),
            fixed_now(),
        );

        assert!(!verdict.feasible);
        assert!(verdict.reasons[0].contains("REQ-03"));
        assert!(verdict.reasons[0].contains("REQ-04"));
    }

    #[test]
    fn test_uncovered_ids_are_capped_at_five() {
        let entries: Vec<RequirementMappingEntry> = (1..=9)
            .map(|i| RequirementMappingEntry {
                requirement_id: format!("REQ-{i:02}"),
                status: "Not Covered".to_string(),
                ..Default::default()
            })
            .collect();
        let proposal = ProposalDocument {
            requirement_mapping: entries,
            ..Default::default()
        };
        let verdict = assess_at(
            &proposal,
            &ProviderProfile::default(),
            &json!({}),
            fixed_now(),
        );

        assert!(verdict.reasons[0].contains("REQ-05"));
        assert!(!verdict.reasons[0].contains("REQ-06"));
    }

    #[test]
    fn test_unknown_mapped_service_is_flagged_once() {
        let proposal = proposal_with(json!({
            "requirement_mapping": [
                { "requirement_id": "REQ-01", "mapped_service": "Web Development", "status": "Covered" },
                { "requirement_id": "REQ-02", "mapped_service": "Quantum Computing", "status": "Covered" },
                { "requirement_id": "REQ-03", "mapped_service": "Blockchain Audit", "status": "Covered" }
            ]
        }));
        let profile = profile_with_services(&["Web Development", "Cloud Migration"]);
        let verdict = assess_at(&proposal, &profile, &json!({}), fixed_now());

        assert!(!verdict.feasible);
        assert_eq!(verdict.reasons.len(), 1);
        assert!(verdict.reasons[0].contains("not present in provider's declared services"));
    }

    #[test]
    fn test_substring_service_match_passes() {
        let proposal = proposal_with(json!({
            "requirement_mapping": [
                { "requirement_id": "REQ-01", "mapped_service": "web development", "status": "Covered" },
                { "requirement_id": "REQ-02", "mapped_service": "Development", "status": "Covered" }
            ]
        }));
        let profile = profile_with_services(&["Web Development Services"]);
        let verdict = assess_at(&proposal, &profile, &json!({}), fixed_now());
        assert!(verdict.feasible);
    }

    #[test]
    fn test_empty_services_skips_capability_rule() {
        let proposal = proposal_with(json!({
            "requirement_mapping": [
                { "requirement_id": "REQ-01", "mapped_service": "Anything", "status": "Covered" }
            ]
        }));
        let verdict = assess_at(
            &proposal,
            &ProviderProfile::default(),
            &json!({}),
            fixed_now(),
        );
        assert!(verdict.feasible);
    }

    #[test]
    fn test_reasons_accumulate_across_rules() {
        let proposal = proposal_with(json!({
            "pricing_and_commercials": { "total_cost": 200000 },
            "delivery_plan": { "total_duration_months": 12 },
            "requirement_mapping": [
                { "requirement_id": "REQ-02", "status": "Not Covered" }
            ]
        }));
        let verdict = assess_at(
            &proposal,
            &ProviderProfile::default(),
            &json!({ "budget": 100000, "deadline": "2026-05-01" }),
            fixed_now(),
        );

        assert!(!verdict.feasible);
        assert_eq!(verdict.reasons.len(), 3);
    }
}
