// Prompt templates for SRS structuring.

pub const SRS_EXTRACT_TEMPLATE: &str = r#"Extract the software requirements from the raw SRS document text below.

Return a JSON object with EXACTLY this schema (no extra keys):
{
  "project_name": "",
  "overview": "",
  "functional_requirements": [],
  "non_functional_requirements": []
}

Rules:
- Use ONLY requirements stated in the document. Do NOT invent any.
- Keep each requirement as one short sentence.
- Put performance, security, and compliance items under non_functional_requirements.

DOCUMENT TEXT:
{raw_text}

{json_only}"#;
