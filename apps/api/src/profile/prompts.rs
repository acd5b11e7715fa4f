// Prompt templates for company-profile structuring.
//
// Placeholders are replaced with `.replace()` at call time; the literal JSON
// braces in the schema block are left untouched because only the exact
// `{raw_text}` / `{json_only}` tokens are substituted.

pub const PROFILE_EXTRACT_TEMPLATE: &str = r#"Extract a structured company profile from the raw document text below.

Return a JSON object with EXACTLY this schema (no extra keys):
{
  "company_identity": { "name": "", "website": "", "contact": { "email": "", "phone": "" } },
  "services": { "Example Service": true },
  "tech_stack": { "frontend": [], "backend": [], "database": [], "cloud": [], "devops": [] },
  "delivery_capability": { "team_size": "", "methodologies": [], "delivery_locations": [] },
  "pricing": { "currency": "", "pricing_model": "", "base_monthly_rate": 0 },
  "compliance": []
}

Rules:
- Use ONLY facts present in the document. Do NOT invent services or technologies.
- "services" maps each offered service name to true.
- Classify technologies into the tech_stack buckets.
- Leave the empty default for anything the document does not state.

DOCUMENT TEXT:
{raw_text}

{json_only}"#;
