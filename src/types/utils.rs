//! Shared utility functions for type serialization and common operations.
//!
//! - `is_blank_value` - Emptiness check shared by validation and fallback
//! - `truncate_chars` - Char-boundary safe truncation for prompts and context
//! - `ParseWithDefault` - Lenient enum parsing for stored values

use serde_json::Value;
use std::fmt::Display;

// =============================================================================
// JSON Value Helpers
// =============================================================================

/// Null, empty list, empty object or whitespace-only string.
pub fn is_blank_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

// =============================================================================
// String Utilities
// =============================================================================

/// Capitalize the first character of a string.
#[inline]
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Truncate to at most `max_chars` characters, appending `...` when cut.
///
/// Counts characters, not bytes, so multi-byte text never splits.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((byte_idx, _)) => format!("{}...", &s[..byte_idx]),
    }
}

// =============================================================================
// Type Parsing
// =============================================================================

/// Trait for parsing strings into enum types with a default fallback.
/// Used for deserializing database values where invalid strings should fall back gracefully.
/// Logs a warning when an invalid value is encountered.
pub trait ParseWithDefault: Sized {
    /// The name of this type for logging purposes.
    fn type_name() -> &'static str;

    /// The default value to use when parsing fails.
    fn default_value() -> Self;

    /// Try to parse the string, returning None if invalid.
    fn try_parse(s: &str) -> Option<Self>;

    /// Parse a string into this type, returning a default value if parsing fails.
    fn parse_or_default(s: &str) -> Self {
        match Self::try_parse(s) {
            Some(v) => v,
            None => {
                tracing::warn!("Invalid {} value '{}', using default", Self::type_name(), s);
                Self::default_value()
            }
        }
    }
}

/// Like `Result::ok` but logs the discarded error at warn level.
pub fn log_filter_warn<T, E: Display>(result: Result<T, E>, context: &str) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("{}: {}", context, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
        use serde_json::json;

    #[test]
    fn test_blank_values() {
        assert!(is_blank_value(&json!(null)));
        assert!(is_blank_value(&json!("   ")));
        assert!(is_blank_value(&json!([])));
        assert!(is_blank_value(&json!({})));
        assert!(!is_blank_value(&json!(0)));
        assert!(!is_blank_value(&json!(["x"])));
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("§§§§", 2), "§§...");
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("fourth"), "Fourth");
        assert_eq!(capitalize_first(""), "");
    }
}
