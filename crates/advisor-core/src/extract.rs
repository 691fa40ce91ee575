//! Structured response extraction.
//!
//! Recovers a single JSON mapping from free-form LLM output. Input is
//! untrusted: it may wrap JSON in prose, fence it in markdown, or contain no
//! JSON at all. Exhausting every scan position is a defined failure, not an
//! error; this module never panics on malformed input.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Deserializer, Map, Value};

lazy_static! {
    /// Triple-backtick code fence, optionally tagged `json`.
    static ref FENCE: Regex = Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("valid fence regex");
}

/// Extract a JSON mapping from raw model output.
///
/// Strategy, in order:
/// 1. whole-string parse, returned if it yields a mapping;
/// 2. narrow to the first fenced code block when one exists;
/// 3. scan left to right and attempt a partial decode at every `{` / `[`
///    position, accepting trailing garbage after the structure closes;
/// 4. a decoded list is unwrapped to its first mapping element.
///
/// Returns `None` when no scan position yields a mapping.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        return Some(map);
    }

    let candidate = FENCE
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text);

    for (position, ch) in candidate.char_indices() {
        if ch != '{' && ch != '[' {
            continue;
        }
        let mut stream = Deserializer::from_str(&candidate[position..]).into_iter::<Value>();
        if let Some(Ok(value)) = stream.next() {
            if let Some(map) = into_mapping(value) {
                return Some(map);
            }
        }
    }

    None
}

/// Accept a mapping directly, or the first mapping inside a list (a
/// single-element wrapper list is common LLM behavior).
fn into_mapping(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        Value::Array(items) => items.into_iter().find_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_parse_of_clean_json() {
        let map = extract_json_object(r#"{"verdict": "approve"}"#).unwrap();
        assert_eq!(map.get("verdict"), Some(&json!("approve")));
    }

    #[test]
    fn test_fenced_json_with_prose_prefix() {
        let text = "Sure! ```json\n{\"verdict\": \"approve\", \"risks\": [], \"suggestions\": []}\n```";
        let map = extract_json_object(text).unwrap();
        assert_eq!(map.get("verdict"), Some(&json!("approve")));
        assert_eq!(map.get("risks"), Some(&json!([])));
        assert_eq!(map.get("suggestions"), Some(&json!([])));
    }

    #[test]
    fn test_untagged_fence() {
        let text = "Here you go:\n```\n{\"model_id\": \"m\"}\n```\nHope that helps!";
        let map = extract_json_object(text).unwrap();
        assert_eq!(map.get("model_id"), Some(&json!("m")));
    }

    #[test]
    fn test_prose_wrapped_object_without_fence() {
        let text = "The recommendation is {\"model_id\": \"anthropic.claude-3-sonnet-20240229-v1:0\"} as requested.";
        let map = extract_json_object(text).unwrap();
        assert!(map.contains_key("model_id"));
    }

    #[test]
    fn test_trailing_garbage_after_object() {
        let map = extract_json_object("{\"a\": 1} and then some commentary").unwrap();
        assert_eq!(map.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_wrapper_list_is_unwrapped() {
        let map = extract_json_object("[{\"verdict\": \"caution\"}]").unwrap();
        assert_eq!(map.get("verdict"), Some(&json!("caution")));
    }

    #[test]
    fn test_list_of_scalars_then_object_scans_forward() {
        // The leading list has no mapping inside, but a later position does.
        let map = extract_json_object("[1, 2, 3] then {\"b\": true}").unwrap();
        assert_eq!(map.get("b"), Some(&json!(true)));
    }

    #[test]
    fn test_unbalanced_brace_recovers_at_later_position() {
        let map = extract_json_object("{oops {\"c\": \"ok\"}").unwrap();
        assert_eq!(map.get("c"), Some(&json!("ok")));
    }

    #[test]
    fn test_failure_cases_return_none() {
        for text in [
            "not json at all",
            "",
            "   ",
            "{",
            "[[[",
            "```json\n\n```",
            "42",
            "\"just a string\"",
            "[1, 2, 3]",
        ] {
            assert!(extract_json_object(text).is_none(), "expected failure for {text:?}");
        }
    }

    #[test]
    fn test_multibyte_input_does_not_panic() {
        assert!(extract_json_object("héllo ✓ nothing structured").is_none());
        let map = extract_json_object("résultat → {\"clé\": \"café\"}").unwrap();
        assert_eq!(map.get("clé"), Some(&json!("café")));
    }
}
