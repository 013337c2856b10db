//! Placeholder sentinel detection
//!
//! The surrounding application historically wrote sentinel entries while a
//! result was pending or had failed, e.g. a single rights entry named
//! "Analysis in Progress". Such values must count as missing, never as
//! content. The check is heuristic: a legitimate single entry that happens to
//! carry one of these names is also treated as a placeholder.

use serde_json::Value;

use super::schema::{FieldShape, FieldSpec};

/// Reserved marker strings, compared case-insensitively after trimming
pub const PLACEHOLDER_MARKERS: &[&str] = &[
    "Analysis in Progress",
    "System Error",
    "Analysis System Limited",
    "AI Analysis Limited",
    "API Configuration Required",
    "Incomplete Information",
];

pub fn is_marker(text: &str) -> bool {
    let text = text.trim();
    PLACEHOLDER_MARKERS
        .iter()
        .any(|m| m.eq_ignore_ascii_case(text))
}

/// Whether `value` is a placeholder standing in for field `spec`.
pub fn is_placeholder(spec: &FieldSpec, value: &Value) -> bool {
    match (spec.shape, value) {
        (FieldShape::Text, Value::String(s)) => is_marker(s),
        (FieldShape::List, Value::Array(items)) if items.len() == 1 => match &items[0] {
            Value::String(s) => is_marker(s),
            Value::Object(entry) => spec
                .identity
                .and_then(|key| entry.get(key))
                .and_then(Value::as_str)
                .is_some_and(is_marker),
            _ => false,
        },
        _ => false,
    }
}
