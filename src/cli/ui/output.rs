use console::style;

use crate::types::{FieldSource, StoredAnalysis};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Metadata block followed by the plain-text digest
    pub fn analysis(&self, stored: &StoredAnalysis) {
        self.header(&format!("{} (case {})", stored.kind.label(), stored.case_id));
        println!("  Version:    {}", stored.version);
        println!("  Confidence: {:.2}", stored.confidence_score);
        println!("  Generated:  {}", stored.generated_at.to_rfc3339());
        println!("  Sources:    {}", source_summary(stored));

        self.section("Analysis");
        println!("{}", stored.content);
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

/// e.g. "2 primary, 1 fallback"
fn source_summary(stored: &StoredAnalysis) -> String {
    let count = |source: FieldSource| stored.sources.values().filter(|s| **s == source).count();
    let parts: Vec<String> = [
        (FieldSource::Primary, "primary"),
        (FieldSource::Secondary, "secondary"),
        (FieldSource::Fallback, "fallback"),
    ]
    .into_iter()
    .filter_map(|(source, name)| match count(source) {
        0 => None,
        n => Some(format!("{} {}", n, name)),
    })
    .collect();

    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnalysisKind;
    use std::collections::BTreeMap;

    #[test]
    fn test_source_summary() {
        let mut sources = BTreeMap::new();
        sources.insert("a".to_string(), FieldSource::Primary);
        sources.insert("b".to_string(), FieldSource::Primary);
        sources.insert("c".to_string(), FieldSource::Fallback);
        let stored = StoredAnalysis {
            id: "x".into(),
            case_id: 1,
            kind: AnalysisKind::RightsAndCaseLaw,
            version: 1,
            content: String::new(),
            structured_payload: serde_json::json!({}),
            confidence_score: 0.77,
            sources,
            generated_at: chrono::Utc::now(),
        };
        assert_eq!(source_summary(&stored), "2 primary, 1 fallback");
    }
}
