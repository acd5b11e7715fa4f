//! SRS structuring: model-first, bullet-harvest fallback.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::extraction::heuristics::parse_rfp_text;
use crate::extraction::prompts::SRS_EXTRACT_TEMPLATE;
use crate::llm_client::json::extract_json;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{CallOptions, LlmGateway};

/// Structured view of an uploaded SRS document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SrsDocument {
    pub project_name: String,
    pub overview: String,
    pub functional_requirements: Vec<String>,
    pub non_functional_requirements: Vec<String>,
}

/// Best-effort structuring; never fails. Mirrors the profile extractor:
/// no credentials or any model failure degrades to the heuristic pass.
pub async fn extract_srs(gateway: &LlmGateway, raw_text: &str) -> SrsDocument {
    if !gateway.has_credentials() {
        return heuristic_srs(raw_text);
    }

    let prompt = SRS_EXTRACT_TEMPLATE
        .replace("{raw_text}", raw_text)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION);
    let options = CallOptions {
        max_tokens: 2048,
        ..Default::default()
    };

    let raw = match gateway.invoke(&prompt, &options).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("SRS structuring call failed, falling back to heuristics: {e}");
            return heuristic_srs(raw_text);
        }
    };

    match extract_json(&raw).map(serde_json::from_value::<SrsDocument>) {
        Ok(Ok(srs)) => srs,
        Ok(Err(e)) => {
            warn!("SRS document failed coercion, falling back to heuristics: {e}");
            heuristic_srs(raw_text)
        }
        Err(e) => {
            warn!("SRS structuring returned no JSON, falling back to heuristics: {e}");
            heuristic_srs(raw_text)
        }
    }
}

/// Regex-grade fallback: first non-empty line as the project name, the first
/// following paragraph as the overview, harvested bullets as functional
/// requirements.
pub fn heuristic_srs(raw_text: &str) -> SrsDocument {
    let project_name = raw_text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string();

    let overview = raw_text
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| block.replace('\n', " "))
        .find(|block| *block != project_name)
        .map(|block| block.chars().take(500).collect())
        .unwrap_or_default();

    SrsDocument {
        project_name,
        overview,
        functional_requirements: parse_rfp_text(raw_text).requirements,
        non_functional_requirements: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_srs_shape() {
        let text = "Inventory System SRS\n\nA warehouse tracking platform.\n\nRequirements:\n- barcode scanning\n- stock alerts\n";
        let srs = heuristic_srs(text);

        assert_eq!(srs.project_name, "Inventory System SRS");
        assert_eq!(srs.overview, "A warehouse tracking platform.");
        assert_eq!(
            srs.functional_requirements,
            vec!["barcode scanning".to_string(), "stock alerts".to_string()]
        );
        assert!(srs.non_functional_requirements.is_empty());
    }

    #[test]
    fn test_heuristic_srs_empty_text() {
        assert_eq!(heuristic_srs(""), SrsDocument::default());
    }
}
