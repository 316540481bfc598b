//! Helpers for pulling structured data out of free-form model replies.
//!
//! Models are asked for "ONLY valid JSON" but routinely wrap it in prose or
//! Markdown fences, so callers slice out the outermost object or array
//! before parsing.

use serde::de::DeserializeOwned;

/// Slice from the first `{` to the last `}` (inclusive).
pub fn extract_json_object(text: &str) -> Option<&str> {
    slice_between(text, '{', '}')
}

/// Slice from the first `[` to the last `]` (inclusive).
pub fn extract_json_array(text: &str) -> Option<&str> {
    slice_between(text, '[', ']')
}

fn slice_between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Parse the outermost JSON object embedded in `text`.
pub fn parse_embedded<T: DeserializeOwned>(text: &str) -> Option<T> {
    let json = extract_json_object(text)?;
    match serde_json::from_str(json) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!(error = %e, "embedded JSON object did not parse");
            None
        }
    }
}

/// Parse the outermost JSON array embedded in `text`.
pub fn parse_embedded_array<T: DeserializeOwned>(text: &str) -> Option<Vec<T>> {
    let json = extract_json_array(text)?;
    match serde_json::from_str(json) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!(error = %e, "embedded JSON array did not parse");
            None
        }
    }
}

/// Remove a leading ```` ```html ````/```` ```json ````/```` ``` ```` fence line
/// and a trailing ```` ``` ````.
pub fn strip_code_fences(text: &str) -> String {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        s = match rest.find('\n') {
            Some(nl) => &rest[nl + 1..],
            None => rest,
        };
    }
    if let Some(rest) = s.trim_end().strip_suffix("```") {
        s = rest;
    }
    s.trim().to_string()
}

/// Cut `text` to at most `max` characters (not bytes).
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
