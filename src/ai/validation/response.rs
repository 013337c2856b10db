//! Response Validation
//!
//! Checks a provider reply against the required-field schema of an
//! [`AnalysisKind`] and reports, per field, whether it is satisfied:
//! - Required fields present, directly or under a known alias
//! - Expected container shape (list / object / text / number)
//! - Non-empty, and not a placeholder sentinel
//!
//! Missing fields are never fatal and content is never invented here.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use super::json_repair::JsonRepairer;
use super::placeholder::is_placeholder;
use super::schema::{AnalysisSchema, FieldSpec, ShapeCheck};
use crate::ai::provider::ProviderReply;
use crate::types::{AnalysisKind, is_blank_value};

/// Severity levels for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    /// Field or payload unusable
    Error,
    /// Usable after normalization, or rejected as empty/placeholder
    Warning,
    Info,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueSeverity::Error => write!(f, "ERROR"),
            IssueSeverity::Warning => write!(f, "WARN"),
            IssueSeverity::Info => write!(f, "INFO"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub message: String,
    pub location: Option<String>,
}

impl ValidationIssue {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            message: message.into(),
            location: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            message: message.into(),
            location: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Info,
            message: message.into(),
            location: None,
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "[{}] {}: {}", self.severity, loc, self.message),
            None => write!(f, "[{}] {}", self.severity, self.message),
        }
    }
}

// =============================================================================
// ValidationReport
// =============================================================================

/// Per-field outcome of validating one reply
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub kind: AnalysisKind,
    /// Satisfied fields under their canonical names
    pub satisfied: BTreeMap<String, Value>,
    /// Missing fields in schema order
    pub missing: Vec<&'static str>,
    /// JSON repair or value normalization was needed
    pub was_repaired: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Report for a kind with nothing satisfied
    pub fn all_missing(kind: AnalysisKind) -> Self {
        Self {
            kind,
            satisfied: BTreeMap::new(),
            missing: AnalysisSchema::for_kind(kind).field_names().collect(),
            was_repaired: false,
            issues: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn is_missing(&self, field: &str) -> bool {
        self.missing.contains(&field)
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Error)
            .count()
    }

    fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }
}

// =============================================================================
// ResponseValidator
// =============================================================================

pub struct ResponseValidator {
    repairer: JsonRepairer,
}

impl Default for ResponseValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseValidator {
    pub fn new() -> Self {
        Self {
            repairer: JsonRepairer::new(),
        }
    }

    pub fn validate_reply(&self, kind: AnalysisKind, reply: &ProviderReply) -> ValidationReport {
        match reply.parsed() {
            Some(value) => self.validate_value(kind, value, false),
            None => self.validate_text(kind, reply.raw_text()),
        }
    }

    /// Parse raw provider text (repairing if needed) and validate it.
    pub fn validate_text(&self, kind: AnalysisKind, raw: &str) -> ValidationReport {
        match self.repairer.parse_or_repair(raw) {
            Ok((value, stage)) => self.validate_value(kind, &value, stage.was_repaired()),
            Err(e) => {
                let mut report = ValidationReport::all_missing(kind);
                report.add(ValidationIssue::error(e.to_string()));
                report
            }
        }
    }

    pub fn validate_value(
        &self,
        kind: AnalysisKind,
        value: &Value,
        was_repaired: bool,
    ) -> ValidationReport {
        let schema = AnalysisSchema::for_kind(kind);
        let mut report = ValidationReport::all_missing(kind);
        report.was_repaired = was_repaired;

        let Some(root) = value.as_object() else {
            report.add(ValidationIssue::error("Response must be a JSON object"));
            return report;
        };
        report.missing.clear();
        let payload = unwrap_envelope(schema, root, &mut report);

        for spec in schema.fields {
            match self.check_field(spec, payload, &mut report) {
                Some(v) => {
                    report.satisfied.insert(spec.name.to_string(), v);
                }
                None => report.missing.push(spec.name),
            }
        }

        report
    }

    fn check_field(
        &self,
        spec: &FieldSpec,
        payload: &Map<String, Value>,
        report: &mut ValidationReport,
    ) -> Option<Value> {
        let present: Vec<(&str, &Value)> = std::iter::once(spec.name)
            .chain(spec.aliases.iter().copied())
            .filter_map(|key| payload.get(key).map(|v| (key, v)))
            .collect();
        // A null or empty canonical key yields to a populated alias
        let (found_as, value) = present
            .iter()
            .copied()
            .find(|(_, v)| !is_blank_value(v))
            .or_else(|| present.first().copied())?;

        if found_as != spec.name {
            report.add(
                ValidationIssue::info(format!("found under alias '{}'", found_as)).at(spec.name),
            );
        }
        if is_blank_value(value) {
            report.add(ValidationIssue::warning("empty value").at(spec.name));
            return None;
        }
        if is_placeholder(spec, value) {
            report.add(ValidationIssue::warning("placeholder sentinel").at(spec.name));
            return None;
        }

        match spec.check(value) {
            ShapeCheck::Ok(v) => Some(v),
            ShapeCheck::Coerced(v) => {
                report.was_repaired = true;
                report.add(ValidationIssue::warning("value normalized").at(spec.name));
                Some(v)
            }
            ShapeCheck::Mismatch => {
                report.add(
                    ValidationIssue::error(format!("expected {}", spec.shape.as_str()))
                        .at(spec.name),
                );
                None
            }
        }
    }
}

/// Descend into `{"<wrapper>": {...}}` when no required key is at top level.
fn unwrap_envelope<'a>(
    schema: &AnalysisSchema,
    root: &'a Map<String, Value>,
    report: &mut ValidationReport,
) -> &'a Map<String, Value> {
    if root.keys().any(|k| schema.recognizes(k)) || root.len() != 1 {
        return root;
    }
    match root.iter().next() {
        Some((key, Value::Object(inner))) => {
            report.add(ValidationIssue::info(format!("payload unwrapped from '{}'", key)));
            inner
        }
        _ => root,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> ResponseValidator {
        ResponseValidator::new()
    }

    #[test]
    fn test_complete_rights_payload() {
        let value = json!({
            "rights_assessment": [{"right_violated": "Fourth Amendment"}],
            "case_law_suggestions": [{"case_name": "Terry v. Ohio"}],
            "winning_strategy": {"primary_strategy": "Suppress"}
        });
        let report = validator().validate_value(AnalysisKind::RightsAndCaseLaw, &value, false);
        assert!(report.is_complete());
        assert_eq!(report.satisfied.len(), 3);
        assert!(!report.was_repaired);
    }

    #[test]
    fn test_partial_payload_reports_missing_independently() {
        let value = json!({
            "rights_assessment": [{"right_violated": "Fifth Amendment"}],
            "winning_strategy": "not an object"
        });
        let report = validator().validate_value(AnalysisKind::RightsAndCaseLaw, &value, false);
        assert_eq!(report.missing, vec!["case_law_suggestions", "winning_strategy"]);
        assert!(report.satisfied.contains_key("rights_assessment"));
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_alias_is_renamed() {
        let value = json!({
            "rights_violations": [{"right_violated": "Sixth Amendment"}],
            "relevant_cases": [{"case_name": "Barker v. Wingo"}],
            "winning_strategy": {"primary_strategy": "Speedy trial motion"}
        });
        let report = validator().validate_value(AnalysisKind::RightsAndCaseLaw, &value, false);
        assert!(report.is_complete());
        assert!(report.satisfied.contains_key("case_law_suggestions"));
        assert!(!report.satisfied.contains_key("relevant_cases"));
    }

    #[test]
    fn test_null_canonical_yields_to_alias() {
        let value = json!({
            "rights_assessment": [{"right_violated": "Fourth Amendment"}],
            "case_law_suggestions": null,
            "relevant_cases": [{"case_name": "Mapp v. Ohio"}],
            "winning_strategy": {"primary_strategy": "Suppress"}
        });
        let report = validator().validate_value(AnalysisKind::RightsAndCaseLaw, &value, false);
        assert!(report.is_complete());
        assert_eq!(
            report.satisfied["case_law_suggestions"][0]["case_name"],
            "Mapp v. Ohio"
        );

        let both_blank = json!({"case_law_suggestions": [], "relevant_cases": null});
        let report = validator().validate_value(AnalysisKind::RightsAndCaseLaw, &both_blank, false);
        assert!(report.is_missing("case_law_suggestions"));
    }

    #[test]
    fn test_placeholder_and_empty_count_as_missing() {
        let value = json!({
            "document_recommendations": [{"document_type": "System Error"}]
        });
        let report =
            validator().validate_value(AnalysisKind::DocumentRecommendations, &value, false);
        assert!(report.is_missing("document_recommendations"));

        let value = json!({"document_recommendations": []});
        let report =
            validator().validate_value(AnalysisKind::DocumentRecommendations, &value, false);
        assert!(report.is_missing("document_recommendations"));
    }

    #[test]
    fn test_envelope_unwrapped() {
        let value = json!({"analysis": {"exhibit_plan": [{"exhibit_group": "Photos"}]}});
        let report = validator().validate_value(AnalysisKind::ExhibitOrganization, &value, false);
        assert!(report.is_complete());
    }

    #[test]
    fn test_text_reply_repaired() {
        let raw = r#"{"evidence_analysis": [{"evidence_id": "E1"},"#;
        let report = validator().validate_text(AnalysisKind::EvidenceRelevance, raw);
        assert!(report.is_complete());
        assert!(report.was_repaired);
    }

    #[test]
    fn test_unparseable_text_is_all_missing() {
        let report = validator().validate_text(AnalysisKind::CourtScript, "I cannot help.");
        assert_eq!(report.missing.len(), 7);
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_percentage_marks_repaired() {
        let value = json!({
            "success_probability": 72,
            "confidence_level": "Moderate",
            "key_factors": ["Warrantless search"],
            "improvement_suggestions": ["File suppression motion"]
        });
        let report = validator().validate_value(AnalysisKind::SuccessProbability, &value, false);
        assert!(report.is_complete());
        assert!(report.was_repaired);
        assert_eq!(report.satisfied["success_probability"], json!(0.72));
    }

    #[test]
    fn test_non_object_root() {
        let report = validator().validate_value(AnalysisKind::AdvancedStrategy, &json!([1]), false);
        assert_eq!(report.missing, vec!["winning_strategy"]);
    }
}
