//! JSON Repair Mechanism
//!
//! Recovers a JSON object from provider output. Stages run in order and the
//! first one that parses wins:
//!
//! 1. Strict parse (after stripping code fences and BOM)
//! 2. Extraction of the first balanced `{...}` substring
//! 3. Repair levels 1-3 of increasing aggressiveness:
//!    trailing commas and missing closers, then truncated strings,
//!    then control characters and trailing garbage

use serde_json::Value;
use tracing::debug;

use crate::types::{CaseError, Result};

/// Which stage produced the parsed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStage {
    Strict,
    Extracted,
    Repaired(u8),
}

impl RepairStage {
    pub fn was_repaired(&self) -> bool {
        !matches!(self, Self::Strict)
    }
}

// =============================================================================
// Structural Scanner
// =============================================================================

/// Tracks string and escape state while walking JSON-ish text.
#[derive(Default)]
struct Scanner {
    in_string: bool,
    escape: bool,
    braces: i32,
    brackets: i32,
}

impl Scanner {
    /// Feed one char; returns true when it was structural (outside a string).
    fn feed(&mut self, ch: char) -> bool {
        if self.escape {
            self.escape = false;
            return false;
        }
        match ch {
            '\\' if self.in_string => {
                self.escape = true;
                false
            }
            '"' => {
                self.in_string = !self.in_string;
                false
            }
            _ if self.in_string => false,
            '{' => {
                self.braces += 1;
                true
            }
            '}' => {
                self.braces -= 1;
                true
            }
            '[' => {
                self.brackets += 1;
                true
            }
            ']' => {
                self.brackets -= 1;
                true
            }
            _ => false,
        }
    }

    fn balanced(&self) -> bool {
        self.braces == 0 && self.brackets == 0
    }
}

// =============================================================================
// JsonRepairer
// =============================================================================

pub struct JsonRepairer {
    max_repair_level: u8,
}

impl Default for JsonRepairer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRepairer {
    pub fn new() -> Self {
        Self {
            max_repair_level: 3,
        }
    }

    /// First balanced `{...}` in `text` that parses as an object.
    pub fn extract_object(text: &str) -> Option<Value> {
        let mut offset = 0;
        while let Some(rel) = text[offset..].find('{') {
            let start = offset + rel;
            if let Some(end) = balanced_end(&text[start..]) {
                if let Ok(value @ Value::Object(_)) =
                    serde_json::from_str::<Value>(&text[start..start + end])
                {
                    return Some(value);
                }
            }
            // Unclosed or unparseable: the next opener may still start an object
            offset = start + 1;
        }
        None
    }

    /// Parse `raw`, escalating through extraction and repair.
    pub fn parse_or_repair(&self, raw: &str) -> Result<(Value, RepairStage)> {
        let cleaned = preprocess(raw);

        if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
            return Ok((value, RepairStage::Strict));
        }

        if let Some(value) = Self::extract_object(&cleaned) {
            debug!("JSON object extracted from mixed content");
            return Ok((value, RepairStage::Extracted));
        }

        // Repairs operate from the first opener onwards so leading prose is dropped
        let body = cleaned
            .find(['{', '['])
            .map(|i| &cleaned[i..])
            .unwrap_or(&cleaned);

        for level in 1..=self.max_repair_level {
            let repaired = repair(body, level);
            if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
                debug!(level, "JSON repaired");
                return Ok((value, RepairStage::Repaired(level)));
            }
        }

        Err(CaseError::SchemaInvalid(format!(
            "unparseable provider output after {} repair levels: {}",
            self.max_repair_level,
            crate::types::truncate_chars(&cleaned, 200)
        )))
    }
}

fn preprocess(raw: &str) -> String {
    let s = raw.trim().trim_start_matches('\u{feff}').trim();
    strip_code_fences(s).trim().to_string()
}

fn strip_code_fences(s: &str) -> &str {
    let mut result = s;
    if result.starts_with("```") {
        if let Some(first_newline) = result.find('\n') {
            result = &result[first_newline + 1..];
        }
    }
    if let Some(stripped) = result.trim_end().strip_suffix("```") {
        result = stripped;
    }
    result
}

/// Byte length of the balanced structure starting at `s[0]`.
fn balanced_end(s: &str) -> Option<usize> {
    let mut scanner = Scanner::default();
    for (i, ch) in s.char_indices() {
        if scanner.feed(ch) && scanner.balanced() {
            return Some(i + ch.len_utf8());
        }
    }
    None
}

fn repair(s: &str, level: u8) -> String {
    let mut result = if level >= 3 {
        s.chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
            .collect()
    } else {
        s.to_string()
    };
    if level >= 2 {
        result = close_truncated_strings(&result);
    }
    result = strip_trailing_commas(&close_open_structures(&result));
    if level >= 3 {
        result = cut_after_last_complete(&result);
    }
    result
}

fn strip_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len());
    let mut scanner = Scanner::default();

    for (i, &ch) in chars.iter().enumerate() {
        let inside = scanner.in_string;
        scanner.feed(ch);
        if ch == ',' && !inside {
            let next = chars[i + 1..].iter().copied().find(|c| !c.is_whitespace());
            if matches!(next, Some(']') | Some('}')) {
                continue;
            }
        }
        result.push(ch);
    }
    result
}

/// Close strings left open at a line break or at end of input.
fn close_truncated_strings(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut scanner = Scanner::default();

    for ch in s.chars() {
        if matches!(ch, '\n' | '\r') && scanner.in_string && !scanner.escape {
            result.push('"');
            scanner.in_string = false;
        }
        scanner.feed(ch);
        result.push(ch);
    }
    if scanner.in_string {
        result.push('"');
    }
    result
}

/// Append the closers a truncated document is missing, innermost first.
fn close_open_structures(s: &str) -> String {
    let mut stack = Vec::new();
    let mut scanner = Scanner::default();

    for ch in s.chars() {
        if scanner.feed(ch) {
            match ch {
                '{' => stack.push('}'),
                '[' => stack.push(']'),
                '}' | ']' => {
                    stack.pop();
                }
                _ => {}
            }
        }
    }

    let mut result = s.to_string();
    if scanner.in_string {
        result.push('"');
    }
    while let Some(closer) = stack.pop() {
        result.push(closer);
    }
    result
}

fn cut_after_last_complete(s: &str) -> String {
    let mut scanner = Scanner::default();
    let mut last = 0;
    for (i, ch) in s.char_indices() {
        if scanner.feed(ch) && matches!(ch, '}' | ']') && scanner.balanced() {
            last = i + 1;
        }
    }
    if last > 0 && last < s.len() {
        s[..last].to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(input: &str) -> (Value, RepairStage) {
        JsonRepairer::new().parse_or_repair(input).unwrap()
    }

    #[test]
    fn test_strict_parse() {
        let (_, stage) = parse(r#"{"key": "value"}"#);
        assert_eq!(stage, RepairStage::Strict);
        assert!(!stage.was_repaired());
    }

    #[test]
    fn test_code_fences_are_not_a_repair() {
        let (value, stage) = parse("```json\n{\"key\": \"value\"}\n```");
        assert_eq!(value["key"], "value");
        assert_eq!(stage, RepairStage::Strict);
    }

    #[test]
    fn test_extraction_precedes_repair() {
        let input = "Here is the analysis:\n{\"rights\": [{\"a\": \"}\"}]}\nHope this helps!";
        let (value, stage) = parse(input);
        assert_eq!(stage, RepairStage::Extracted);
        assert_eq!(value["rights"][0]["a"], "}");
    }

    #[test]
    fn test_extract_skips_unparseable_candidates() {
        let text = "{not json} then {\"ok\": 1}";
        assert_eq!(JsonRepairer::extract_object(text), Some(json!({"ok": 1})));
        assert_eq!(JsonRepairer::extract_object("[1, 2]"), None);
    }

    #[test]
    fn test_extract_past_unclosed_opener() {
        let text = "Draft { still thinking... Final: {\"ok\": true}";
        assert_eq!(JsonRepairer::extract_object(text), Some(json!({"ok": true})));

        let nested = "{broken {\"inner\": 2}";
        assert_eq!(JsonRepairer::extract_object(nested), Some(json!({"inner": 2})));
        assert_eq!(JsonRepairer::extract_object("{ never closes"), None);
    }

    #[test]
    fn test_trailing_comma_repair() {
        let (value, stage) = parse(r#"{"items": [{"n": 1},]}"#);
        assert_eq!(stage, RepairStage::Repaired(1));
        assert!(value["items"].is_array());
    }

    #[test]
    fn test_truncated_document_is_closed() {
        let (value, stage) = parse(r#"{"items": [{"n": 1}, {"n": 2"#);
        assert!(stage.was_repaired());
        assert_eq!(value["items"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_truncated_string_closed() {
        let (value, _) = parse("{\"name\": \"cut off here");
        assert_eq!(value["name"], "cut off here");
    }

    #[test]
    fn test_commas_inside_strings_survive() {
        let (value, _) = parse(r#"{"text": "a, ]", "list": [1,],"#);
        assert_eq!(value["text"], "a, ]");
    }

    #[test]
    fn test_garbage_is_schema_invalid() {
        let err = JsonRepairer::new().parse_or_repair("no json at all").unwrap_err();
        assert!(matches!(err, CaseError::SchemaInvalid(_)));
    }
}
