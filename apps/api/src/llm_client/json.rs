//! JSON extraction from free-form model output.
//!
//! Even with JSON mode requested, models sometimes wrap their answer in
//! prose or fences. The extractor scans for the outermost brace pair and
//! parses that span, ignoring everything around it.

use serde_json::Value;
use thiserror::Error;

/// The model output contained no parseable JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("model output did not contain a parseable JSON object")]
pub struct ExtractionFailed;

/// Extracts the JSON object spanning the first `{` and the last `}` of
/// `text`. Text before and after the span is discarded. Fails when either
/// brace is missing or the span is not valid JSON.
pub fn extract_json(text: &str) -> Result<Value, ExtractionFailed> {
    let start = text.find('{').ok_or(ExtractionFailed)?;
    let end = text.rfind('}').ok_or(ExtractionFailed)?;
    if end < start {
        return Err(ExtractionFailed);
    }
    serde_json::from_str(&text[start..=end]).map_err(|_| ExtractionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_plain_object() {
        let value = extract_json(r#"{"a": 1, "b": [2, 3]}"#).unwrap();
        assert_eq!(value, json!({"a": 1, "b": [2, 3]}));
    }

    #[test]
    fn test_extract_with_surrounding_prose() {
        let text = "Sure, here is the proposal:\n{\"ok\": true}\nLet me know!";
        let value = extract_json(text).unwrap();
        assert_eq!(value, json!({"ok": true}));
    }

    #[test]
    fn test_extract_with_markdown_fences() {
        let text = "```json\n{\"status\": \"done\"}\n```";
        let value = extract_json(text).unwrap();
        assert_eq!(value["status"], "done");
    }

    #[test]
    fn test_extract_keeps_nested_braces() {
        let text = "prefix {\"outer\": {\"inner\": 7}} suffix";
        let value = extract_json(text).unwrap();
        assert_eq!(value["outer"]["inner"], 7);
    }

    #[test]
    fn test_no_braces_is_an_error() {
        assert_eq!(extract_json("no json here"), Err(ExtractionFailed));
        assert_eq!(extract_json(""), Err(ExtractionFailed));
    }

    #[test]
    fn test_reversed_braces_is_an_error() {
        assert_eq!(extract_json("} backwards {"), Err(ExtractionFailed));
    }

    #[test]
    fn test_unparseable_span_is_an_error() {
        assert_eq!(extract_json("{not json}"), Err(ExtractionFailed));
    }
}
