//! Removal of invisible formatting characters from fetched content.
//!
//! CMS payloads can carry zero-width and bidirectional control marks (editor
//! artifacts, pasted text, visual-editing encodings). They are stripped from every
//! string leaf before content reaches the renderers or the JSON API.

use serde_json::{Map, Value};

/// Returns true for characters that render as nothing but alter text handling.
pub fn is_invisible(c: char) -> bool {
    matches!(
        c,
        // zero-width space, non-joiner, joiner, LTR/RTL marks
        '\u{200B}'..='\u{200F}'
        // bidi embeddings and overrides
        | '\u{202A}'..='\u{202E}'
        // word joiner and invisible operators
        | '\u{2060}'..='\u{2064}'
        // bidi isolates
        | '\u{2066}'..='\u{2069}'
        | '\u{061C}'
        | '\u{180E}'
        | '\u{FEFF}'
    ) || (c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
}

/// Strip invisible characters from a single string.
pub fn sanitize_str(input: &str) -> String {
    input.chars().filter(|c| !is_invisible(*c)).collect()
}

/// Produce a cleaned copy of `value`. Shape, keys and non-string leaves are kept.
pub fn sanitize(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_str(s)),
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), sanitize(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
    }
}
