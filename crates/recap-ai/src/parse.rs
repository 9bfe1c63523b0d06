//! Tolerant parsing of LLM JSON responses: strip markdown fences, extract
//! the first balanced `{...}` block, then parse.

use serde::de::DeserializeOwned;

use crate::error::{AiError, AiResult};

/// Strips a leading/trailing ``` ```json ``` fence if present.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix("```json").or_else(|| text.strip_prefix("```")).unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

/// Scans for the first balanced `{...}` block, respecting string literals
/// and escapes so braces inside quoted text don't throw off the count.
fn extract_balanced_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parses an LLM text response tolerant of markdown fences and trailing
/// prose, extracting and deserializing the first balanced JSON object.
pub fn parse_llm_json<T: DeserializeOwned>(raw: &str) -> AiResult<T> {
    let stripped = strip_code_fence(raw);
    let object = extract_balanced_object(stripped)
        .ok_or_else(|| AiError::request_failed("no JSON object found in model response"))?;
    serde_json::from_str(object).map_err(AiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        a: u32,
        b: String,
    }

    #[test]
    fn parses_plain_json() {
        let parsed: Sample = parse_llm_json(r#"{"a": 1, "b": "hi"}"#).unwrap();
        assert_eq!(parsed, Sample { a: 1, b: "hi".to_string() });
    }

    #[test]
    fn strips_markdown_fence() {
        let raw = "```json\n{\"a\": 2, \"b\": \"x\"}\n```";
        let parsed: Sample = parse_llm_json(raw).unwrap();
        assert_eq!(parsed.a, 2);
    }

    #[test]
    fn ignores_trailing_prose() {
        let raw = r#"Sure, here you go: {"a": 3, "b": "y"} Hope that helps!"#;
        let parsed: Sample = parse_llm_json(raw).unwrap();
        assert_eq!(parsed.a, 3);
    }

    #[test]
    fn tolerates_braces_inside_strings() {
        let raw = r#"{"a": 4, "b": "a {nested} brace"}"#;
        let parsed: Sample = parse_llm_json(raw).unwrap();
        assert_eq!(parsed.b, "a {nested} brace");
    }

    #[test]
    fn errors_on_missing_object() {
        let result: AiResult<Sample> = parse_llm_json("no json here");
        assert!(result.is_err());
    }
}
