use regex::Regex;
use serde_json::Value;
use thiserror::Error;

const EXCERPT_LEN: usize = 500;

#[derive(Debug, Error)]
#[error("could not parse JSON from model output: {excerpt}...")]
pub struct RecoveryError {
    pub excerpt: String,
}

/// Recovers a JSON object from free-form model output. Ordered strategies,
/// first success wins:
/// 1. parse the whole text,
/// 2. parse the interior of a fenced code block (```json or untagged),
/// 3. parse the span from the first `{` to the last `}`.
///
/// A fenced block outranks a brace scan so that a well-formed block wins over
/// an accidental brace match in surrounding prose. Only JSON objects count as
/// success.
pub fn recover_json(text: &str) -> Result<Value, RecoveryError> {
    if let Some(value) = parse_object(text) {
        return Ok(value);
    }

    let fence = Regex::new(r"```(?:json)?\s*([\s\S]*?)```").expect("valid fence pattern");
    if let Some(captures) = fence.captures(text) {
        if let Some(value) = parse_object(&captures[1]) {
            return Ok(value);
        }
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Some(value) = parse_object(&text[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(RecoveryError {
        excerpt: text.chars().take(EXCERPT_LEN).collect(),
    })
}

fn parse_object(text: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    value.is_object().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_parse() {
        let value = recover_json(r#"{"assets": [], "confidence": 0.9}"#).unwrap();
        assert_eq!(value["confidence"], json!(0.9));
    }

    #[test]
    fn test_fenced_block_with_tag() {
        let text = "Here is the result:\n```json\n{\"a\": 1}\n```\nDone.";
        assert_eq!(recover_json(text).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_fenced_block_without_tag() {
        let text = "```\n{\"a\": 2}\n```";
        assert_eq!(recover_json(text).unwrap(), json!({"a": 2}));
    }

    #[test]
    fn test_fenced_block_matches_direct_parse_of_interior() {
        let interior = r#"{"a":1}"#;
        let embedded = format!("prose before\n```json {interior} ```\nprose after");
        let direct: Value = serde_json::from_str(interior).unwrap();
        assert_eq!(recover_json(&embedded).unwrap(), direct);
    }

    #[test]
    fn test_fenced_block_wins_over_brace_scan() {
        // Braces appear in prose before the fenced block; the block must win.
        let text = "ignore {this} stray pair\n```json\n{\"winner\": true}\n```";
        assert_eq!(recover_json(text).unwrap(), json!({"winner": true}));
    }

    #[test]
    fn test_brace_scan_fallback() {
        let text = "The result is {\"b\": 3} as requested.";
        assert_eq!(recover_json(text).unwrap(), json!({"b": 3}));
    }

    #[test]
    fn test_non_object_json_is_rejected() {
        assert!(recover_json("[1, 2, 3]").is_err());
        assert!(recover_json("42").is_err());
    }

    #[test]
    fn test_unrecoverable_text_carries_excerpt() {
        let text = "x".repeat(2000);
        let err = recover_json(&text).unwrap_err();
        assert_eq!(err.excerpt.len(), 500);
    }
}
