//! The fixed ten-section proposal schema and its coercion.
//!
//! Model output is coerced one section at a time: each top-level section
//! deserializes independently and falls back to its empty default when
//! missing, null, or mistyped. Unknown top-level keys are discarded by
//! construction: the struct literal in [`sanitize`] is the allowed key
//! set, and the compiler keeps it complete.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalDocument {
    pub executive_summary: ExecutiveSummary,
    pub understanding_of_requirements: RequirementUnderstanding,
    pub requirement_mapping: Vec<RequirementMappingEntry>,
    pub solution_architecture: SolutionArchitecture,
    pub delivery_plan: DeliveryPlan,
    pub pricing_and_commercials: PricingAndCommercials,
    pub requirement_traceability_matrix: Vec<TraceabilityEntry>,
    pub assumptions_and_exclusions: AssumptionsAndExclusions,
    pub risk_and_mitigation: Vec<RiskEntry>,
    pub company_credentials: CompanyCredentials,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutiveSummary {
    pub overview: String,
    pub value_proposition: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementUnderstanding {
    pub project_overview: String,
    pub key_objectives: Vec<String>,
    pub in_scope: Vec<String>,
    pub out_of_scope: Vec<String>,
}

/// One row of the requirement → capability mapping. `status` is free text;
/// the feasibility rules scan it for "not covered" style markers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementMappingEntry {
    pub requirement_id: String,
    pub description: String,
    pub mapped_service: String,
    pub mapped_technology: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolutionArchitecture {
    pub architecture_overview: String,
    pub components: Vec<String>,
    pub security_considerations: Vec<String>,
    pub scalability_notes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryPlan {
    pub phases: Vec<DeliveryPhase>,
    pub total_duration_months: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryPhase {
    pub phase_name: String,
    pub duration_weeks: f64,
    pub deliverables: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingAndCommercials {
    pub currency: String,
    pub team_composition: TeamComposition,
    pub total_cost: f64,
    pub pricing_notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamComposition {
    pub role: String,
    pub count: u32,
    pub monthly_cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceabilityEntry {
    pub requirement_id: String,
    pub requirement: String,
    pub solution_reference: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssumptionsAndExclusions {
    pub assumptions: Vec<String>,
    pub exclusions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskEntry {
    pub risk: String,
    pub impact: String,
    pub mitigation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyCredentials {
    pub relevant_experience: Vec<String>,
    pub case_studies: Vec<String>,
}

/// Coerces arbitrary model JSON into the fixed schema. Idempotent: running
/// it over its own serialized output is the identity.
pub fn sanitize(raw: &Value) -> ProposalDocument {
    ProposalDocument {
        executive_summary: section(raw, "executive_summary"),
        understanding_of_requirements: section(raw, "understanding_of_requirements"),
        requirement_mapping: section(raw, "requirement_mapping"),
        solution_architecture: section(raw, "solution_architecture"),
        delivery_plan: section(raw, "delivery_plan"),
        pricing_and_commercials: section(raw, "pricing_and_commercials"),
        requirement_traceability_matrix: section(raw, "requirement_traceability_matrix"),
        assumptions_and_exclusions: section(raw, "assumptions_and_exclusions"),
        risk_and_mitigation: section(raw, "risk_and_mitigation"),
        company_credentials: section(raw, "company_credentials"),
    }
}

/// One section: deserialize if present and well-typed, default otherwise.
fn section<T: DeserializeOwned + Default>(raw: &Value, key: &str) -> T {
    raw.get(key)
        .and_then(|value| serde_json::from_value(value.clone()).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECTION_KEYS: [&str; 10] = [
        "executive_summary",
        "understanding_of_requirements",
        "requirement_mapping",
        "solution_architecture",
        "delivery_plan",
        "pricing_and_commercials",
        "requirement_traceability_matrix",
        "assumptions_and_exclusions",
        "risk_and_mitigation",
        "company_credentials",
    ];

    #[test]
    fn test_sanitize_always_emits_all_ten_sections() {
        let doc = sanitize(&json!({}));
        let value = serde_json::to_value(&doc).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 10);
        for key in SECTION_KEYS {
            assert!(keys.contains(&key), "missing section {key}");
        }
    }

    #[test]
    fn test_sanitize_drops_unknown_keys() {
        let raw = json!({
            "executive_summary": { "overview": "short", "value_proposition": "value" },
            "invented_section": { "anything": true },
            "notes": "loose text"
        });
        let value = serde_json::to_value(sanitize(&raw)).unwrap();
        assert!(value.get("invented_section").is_none());
        assert!(value.get("notes").is_none());
        assert_eq!(value["executive_summary"]["overview"], "short");
    }

    #[test]
    fn test_sanitize_defaults_missing_sections() {
        let raw = json!({
            "pricing_and_commercials": { "currency": "USD", "total_cost": 90000 }
        });
        let doc = sanitize(&raw);

        assert_eq!(doc.pricing_and_commercials.currency, "USD");
        assert_eq!(doc.pricing_and_commercials.total_cost, 90000.0);
        assert_eq!(doc.executive_summary, ExecutiveSummary::default());
        assert!(doc.requirement_mapping.is_empty());
        assert_eq!(doc.delivery_plan.total_duration_months, 0.0);
    }

    #[test]
    fn test_sanitize_defaults_null_and_mistyped_sections() {
        let raw = json!({
            "executive_summary": null,
            "delivery_plan": "six months",
            "requirement_mapping": 42
        });
        let doc = sanitize(&raw);

        assert_eq!(doc.executive_summary, ExecutiveSummary::default());
        assert_eq!(doc.delivery_plan, DeliveryPlan::default());
        assert!(doc.requirement_mapping.is_empty());
    }

    #[test]
    fn test_sanitize_fills_partial_entries() {
        let raw = json!({
            "requirement_mapping": [
                { "requirement_id": "REQ-01", "status": "Covered" }
            ]
        });
        let doc = sanitize(&raw);

        assert_eq!(doc.requirement_mapping.len(), 1);
        assert_eq!(doc.requirement_mapping[0].requirement_id, "REQ-01");
        assert_eq!(doc.requirement_mapping[0].mapped_service, "");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let raw = json!({
            "executive_summary": { "overview": "o", "value_proposition": "v" },
            "delivery_plan": {
                "phases": [{ "phase_name": "Discovery", "duration_weeks": 2, "deliverables": ["report"] }],
                "total_duration_months": 6
            },
            "extra": "to drop"
        });
        let once = sanitize(&raw);
        let twice = sanitize(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice);
    }
}
