//! Company-profile extraction: model-first with a heuristic floor.
//!
//! The heuristic extractor is the floor, not an error path. With no API
//! credential configured the gateway is skipped entirely; with one, any
//! gateway, extraction, or coercion failure degrades to the heuristics.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::llm_client::json::extract_json;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{CallOptions, LlmGateway};
use crate::profile::prompts::PROFILE_EXTRACT_TEMPLATE;
use crate::profile::schema::{ProviderProfile, TechStack};

const FRONTEND_KEYWORDS: &[&str] = &[
    "React", "Angular", "Vue", "Next.js", "Svelte", "TypeScript", "JavaScript", "Tailwind",
    "Flutter", "HTML", "CSS",
];
const BACKEND_KEYWORDS: &[&str] = &[
    "Node.js", "Express", "Django", "Flask", "Spring", "Rails", "Laravel", ".NET", "Golang",
    "Rust", "Java", "Python", "PHP",
];
const DATABASE_KEYWORDS: &[&str] = &[
    "PostgreSQL", "Postgres", "MySQL", "MongoDB", "Redis", "SQLite", "Oracle", "DynamoDB",
    "Elasticsearch", "Cassandra",
];
const CLOUD_KEYWORDS: &[&str] = &[
    "AWS", "Azure", "GCP", "Google Cloud", "DigitalOcean", "Heroku", "Kubernetes", "Docker",
    "Serverless",
];
const DEVOPS_KEYWORDS: &[&str] = &[
    "Docker", "Kubernetes", "Terraform", "Ansible", "Jenkins", "GitHub Actions", "GitLab CI",
    "CI/CD", "Prometheus", "Grafana",
];

/// Best-effort extraction; never fails.
pub async fn extract_company_profile(gateway: &LlmGateway, raw_text: &str) -> ProviderProfile {
    if !gateway.has_credentials() {
        return heuristic_profile(raw_text);
    }

    let prompt = PROFILE_EXTRACT_TEMPLATE
        .replace("{raw_text}", raw_text)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION);
    let options = CallOptions {
        max_tokens: 2048,
        ..Default::default()
    };

    let raw = match gateway.invoke(&prompt, &options).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("profile extraction call failed, falling back to heuristics: {e}");
            return heuristic_profile(raw_text);
        }
    };

    let value = match extract_json(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("profile extraction returned no JSON, falling back to heuristics: {e}");
            return heuristic_profile(raw_text);
        }
    };

    match serde_json::from_value::<ProviderProfile>(value) {
        Ok(profile) => profile,
        Err(e) => {
            warn!("profile document failed coercion, falling back to heuristics: {e}");
            heuristic_profile(raw_text)
        }
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap()
    })
}

fn company_suffix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"\b([A-Z][\w&.'-]*(?:\s+[A-Z][\w&.'-]*){0,4}\s+(?:Ltd\.?|Limited|Inc\.?|LLC|LLP|GmbH|Solutions|Technologies|Systems|Software|Labs|Consulting))\b",
        )
        .unwrap()
    })
}

/// Regex-only profile recovery. The name is the first non-empty line,
/// overridden by a company-suffix match anywhere in the text; the email is
/// the first standard-looking address; the stack comes from keyword tables
/// matched case-insensitively as substrings.
pub fn heuristic_profile(raw_text: &str) -> ProviderProfile {
    let mut profile = ProviderProfile::default();

    if let Some(line) = raw_text.lines().map(str::trim).find(|line| !line.is_empty()) {
        profile.company_identity.name = line.to_string();
    }
    if let Some(name) = company_suffix_pattern()
        .captures(raw_text)
        .and_then(|caps| caps.get(1))
    {
        profile.company_identity.name = name.as_str().trim().to_string();
    }

    if let Some(email) = email_pattern().find(raw_text) {
        profile.company_identity.contact.email = email.as_str().to_string();
    }

    profile.tech_stack = classify_tech_stack(raw_text);
    profile
}

/// Independent substring tests per bucket; a keyword listed in several
/// tables lands in each matching bucket.
pub fn classify_tech_stack(raw_text: &str) -> TechStack {
    let haystack = raw_text.to_lowercase();
    let hits = |table: &[&str]| -> Vec<String> {
        table
            .iter()
            .filter(|keyword| haystack.contains(&keyword.to_lowercase()))
            .map(|keyword| keyword.to_string())
            .collect()
    };

    TechStack {
        frontend: hits(FRONTEND_KEYWORDS),
        backend: hits(BACKEND_KEYWORDS),
        database: hits(DATABASE_KEYWORDS),
        cloud: hits(CLOUD_KEYWORDS),
        devops: hits(DEVOPS_KEYWORDS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_is_the_name() {
        let profile = heuristic_profile("\n  Orbit Digital\nWe build things.\n");
        assert_eq!(profile.company_identity.name, "Orbit Digital");
    }

    #[test]
    fn test_company_suffix_overrides_first_line() {
        let text = "Capability statement\nFounded in 2015, Acme Solutions delivers software.";
        let profile = heuristic_profile(text);
        assert_eq!(profile.company_identity.name, "Acme Solutions");
    }

    #[test]
    fn test_email_is_captured() {
        let profile = heuristic_profile("Acme Ltd\nReach us at hello@acme.io for quotes.");
        assert_eq!(profile.company_identity.contact.email, "hello@acme.io");
    }

    #[test]
    fn test_stack_keywords_must_appear_in_text() {
        let text = "We ship React frontends backed by PostgreSQL on AWS.";
        let stack = classify_tech_stack(text);

        assert_eq!(stack.frontend, vec!["React"]);
        assert!(stack.database.contains(&"PostgreSQL".to_string()));
        assert_eq!(stack.cloud, vec!["AWS"]);
        assert!(stack.backend.is_empty());
        assert!(stack.devops.is_empty());
    }

    #[test]
    fn test_overlapping_keyword_lands_in_both_buckets() {
        let stack = classify_tech_stack("Everything runs on Docker.");
        assert!(stack.cloud.contains(&"Docker".to_string()));
        assert!(stack.devops.contains(&"Docker".to_string()));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let stack = classify_tech_stack("angular and MONGODB experience");
        assert_eq!(stack.frontend, vec!["Angular"]);
        assert_eq!(stack.database, vec!["MongoDB"]);
    }

    #[test]
    fn test_empty_text_yields_default_profile() {
        let profile = heuristic_profile("");
        assert_eq!(profile, ProviderProfile::default());
    }
}
