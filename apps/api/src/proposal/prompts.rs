// Prompt templates for proposal generation and refinement.
//
// Placeholders ({overview_json}, {profile_json}, {srs_text}, {proposal_json},
// {schema_json}) are substituted with `.replace()`; the literal braces of the
// embedded schema are never touched because only exact tokens are replaced.

/// Output schema fragment shared by the generate and refine prompts. Kept in
/// sync with `schema::ProposalDocument` by the sanitizer tests.
pub const PROPOSAL_SCHEMA_JSON: &str = r#"{
  "executive_summary": { "overview": "", "value_proposition": "" },
  "understanding_of_requirements": { "project_overview": "", "key_objectives": [], "in_scope": [], "out_of_scope": [] },
  "requirement_mapping": [ { "requirement_id": "REQ-01", "description": "", "mapped_service": "", "mapped_technology": "", "status": "Covered | Partial | Not Covered" } ],
  "solution_architecture": { "architecture_overview": "", "components": [], "security_considerations": [], "scalability_notes": [] },
  "delivery_plan": { "phases": [ { "phase_name": "", "duration_weeks": 0, "deliverables": [] } ], "total_duration_months": 0 },
  "pricing_and_commercials": { "currency": "", "team_composition": { "role": "", "count": 0, "monthly_cost": 0 }, "total_cost": 0, "pricing_notes": "" },
  "requirement_traceability_matrix": [ { "requirement_id": "REQ-01", "requirement": "", "solution_reference": "", "status": "" } ],
  "assumptions_and_exclusions": { "assumptions": [], "exclusions": [] },
  "risk_and_mitigation": [ { "risk": "", "impact": "Low | Medium | High", "mitigation": "" } ],
  "company_credentials": { "relevant_experience": [], "case_studies": [] }
}"#;

pub const GENERATE_PROMPT_TEMPLATE: &str = r#"Your job: generate a complete, enterprise-grade RFP response strictly from the inputs below. Do NOT hallucinate. If information is missing, state assumptions.

INPUT 1 — Approved Client Overview (final, single source of truth):
{overview_json}

INPUT 2 — Provider Company Profile (what the provider CAN offer):
{profile_json}

INPUT 3 — SRS PDF raw text (optional, may be blank):
{srs_text}

TASKS in order:
1) Understand requirements and normalize them into a REQ-01... list
2) Map each requirement to provider services & tech stack (mark Not Covered if unsupported)
3) Design the solution architecture using ONLY the provider tech stack
4) Create the delivery plan & timeline from the provider delivery capability
5) Calculate pricing using the provider pricing rules (currency and monthly costs)
6) Produce the Requirement Traceability Matrix (RTM)
7) State assumptions & exclusions
8) Identify risks & mitigations
9) Structure the final proposal as strict JSON only, using this schema:

{schema_json}

Return ONLY the JSON object, no extra text."#;

pub const REFINE_PROMPT_TEMPLATE: &str = r#"Refine and upgrade the existing RFP proposal into a CLIENT-READY, ENTERPRISE-GRADE RFP RESPONSE strictly aligned with the provider's capabilities.

INPUTS:
1) Approved Client Overview (final): {overview_json}
2) Provider Company Profile: {profile_json}
3) Existing Proposal JSON: {proposal_json}

CRITICAL RULES:
- Only propose services and technologies present in the provider profile.
- Pricing must follow the provider pricing rules.
- Delivery must match the provider delivery capability.
- Do not hallucinate. If information is missing, state assumptions.

TASKS (refinement):
1) Requirement understanding and normalization into REQ-01...
2) Requirement -> capability mapping with status (Covered | Partial | Not Covered)
3) Solution architecture using the provider tech stack
4) Delivery plan with phases, milestones, owners
5) Pricing calculation from the provider pricing rules and margins
6) Requirement Traceability Matrix
7) Assumptions & exclusions
8) Risks & mitigations
9) Acceptance criteria & governance

OUTPUT: Return ONLY a single JSON object that matches this schema exactly (no extra keys):
{schema_json}

Return ONLY the JSON object. No explanation. No markdown."#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::schema::sanitize;

    #[test]
    fn test_schema_fragment_parses_and_sanitizes_to_itself_shape() {
        let value: serde_json::Value = serde_json::from_str(PROPOSAL_SCHEMA_JSON).unwrap();
        let doc = sanitize(&value);
        // Every section in the fragment survives coercion.
        assert_eq!(doc.requirement_mapping.len(), 1);
        assert_eq!(doc.requirement_mapping[0].requirement_id, "REQ-01");
        assert_eq!(doc.delivery_plan.phases.len(), 1);
    }

    #[test]
    fn test_templates_keep_their_placeholders() {
        for token in ["{overview_json}", "{profile_json}", "{srs_text}", "{schema_json}"] {
            assert!(GENERATE_PROMPT_TEMPLATE.contains(token), "generate missing {token}");
        }
        for token in ["{overview_json}", "{profile_json}", "{proposal_json}", "{schema_json}"] {
            assert!(REFINE_PROMPT_TEMPLATE.contains(token), "refine missing {token}");
        }
    }
}
