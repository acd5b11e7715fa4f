// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Common instruction appended to structuring prompts that must yield JSON.
pub const JSON_ONLY_INSTRUCTION: &str =
    "Return ONLY the JSON object. No explanation. No markdown.";

/// Tiny prompt used by the gateway diagnostics endpoint.
pub const GATEWAY_TEST_PROMPT: &str =
    r#"Please respond with a single JSON object: { "status": "ok" }"#;
