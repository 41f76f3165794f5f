//! Pull a JSON document out of model text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static FENCED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").expect("fence pattern is valid")
});

/// Parse `text` as JSON.
///
/// Accepts a bare document, a Markdown code fence (with or without a `json`
/// tag), or prose surrounding one or more objects. Returns the first
/// document that parses, or `None`; callers decide whether that is fatal.
pub fn extract_json(text: &str) -> Option<Value> {
    extract_json_candidates(text).into_iter().next()
}

/// Every JSON document recoverable from `text`, most likely first.
///
/// A bare document wins outright. Otherwise the fenced block comes first,
/// followed by each top-level balanced `{...}` in the prose, left to right.
pub fn extract_json_candidates(text: &str) -> Vec<Value> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if let Ok(parsed) = serde_json::from_str::<Value>(text) {
        return vec![parsed];
    }

    let mut candidates = Vec::new();
    if let Some(inner) = FENCED.captures(text).and_then(|c| c.get(1)) {
        if let Ok(parsed) = serde_json::from_str::<Value>(inner.as_str()) {
            candidates.push(parsed);
        }
    }

    for object in balanced_objects(text) {
        if let Ok(parsed) = serde_json::from_str::<Value>(object) {
            if !candidates.contains(&parsed) {
                candidates.push(parsed);
            }
        }
    }
    candidates
}

/// Top-level `{...}` spans, skipping braces inside JSON strings.
fn balanced_objects(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if depth == 0 {
            if c == '{' {
                start = i;
                depth = 1;
            }
            continue;
        }
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    spans.push(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_json() {
        assert_eq!(
            extract_json(r#"{"script": "Hi"}"#),
            Some(json!({"script": "Hi"}))
        );
    }

    #[test]
    fn test_fenced_json() {
        let text = "```json\n{\"script\": \"Hi\"}\n```";
        assert_eq!(extract_json(text), Some(json!({"script": "Hi"})));

        let text = "```\n{\"script\": \"Hi\"}\n```";
        assert_eq!(extract_json(text), Some(json!({"script": "Hi"})));
    }

    #[test]
    fn test_object_in_prose() {
        let text = "Sure! Here it is: {\"script\": \"Hi\"} Enjoy.";
        assert_eq!(extract_json(text), Some(json!({"script": "Hi"})));
    }

    #[test]
    fn test_each_object_in_prose_is_a_candidate() {
        let text = r#"Here: {"a":1} and {"script":"x"}"#;
        assert_eq!(
            extract_json_candidates(text),
            vec![json!({"a": 1}), json!({"script": "x"})]
        );
        assert_eq!(extract_json(text), Some(json!({"a": 1})));
    }

    #[test]
    fn test_braces_inside_strings_and_nesting() {
        let text = r#"Output: {"script": "Say \"}\" loud", "meta": {"n": 1}} done"#;
        assert_eq!(
            extract_json(text),
            Some(json!({"script": "Say \"}\" loud", "meta": {"n": 1}}))
        );
    }

    #[test]
    fn test_nothing_parseable() {
        assert_eq!(extract_json(""), None);
        assert_eq!(extract_json("   "), None);
        assert_eq!(extract_json("just words"), None);
        assert_eq!(extract_json("a { broken"), None);
    }
}
