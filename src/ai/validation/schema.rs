//! Required-field schemas per analysis kind
//!
//! Each [`AnalysisKind`] maps to one static [`AnalysisSchema`] through an
//! exhaustive match, so adding a kind without a schema does not compile.

use serde_json::{Number, Value};

use crate::types::AnalysisKind;

/// Expected container shape of a top-level field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    List,
    Object,
    Text,
    /// Probability in [0, 1]
    Number,
}

impl FieldShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Object => "object",
            Self::Text => "text",
            Self::Number => "number",
        }
    }
}

/// One required top-level field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub shape: FieldShape,
    /// Key naming each list entry, used for placeholders and summaries
    pub identity: Option<&'static str>,
    /// Alternate names providers have been seen to use
    pub aliases: &'static [&'static str],
}

/// Result of checking one value against a field spec
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeCheck {
    Ok(Value),
    /// Accepted after normalization (e.g. a percentage rescaled)
    Coerced(Value),
    Mismatch,
}

impl FieldSpec {
    const fn list(name: &'static str, identity: &'static str) -> Self {
        Self {
            name,
            shape: FieldShape::List,
            identity: Some(identity),
            aliases: &[],
        }
    }

    const fn plain_list(name: &'static str) -> Self {
        Self {
            name,
            shape: FieldShape::List,
            identity: None,
            aliases: &[],
        }
    }

    const fn object(name: &'static str) -> Self {
        Self {
            name,
            shape: FieldShape::Object,
            identity: None,
            aliases: &[],
        }
    }

    const fn text(name: &'static str) -> Self {
        Self {
            name,
            shape: FieldShape::Text,
            identity: None,
            aliases: &[],
        }
    }

    const fn number(name: &'static str) -> Self {
        Self {
            name,
            shape: FieldShape::Number,
            identity: None,
            aliases: &[],
        }
    }

    const fn alias(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    /// Check `value` against this field's shape, normalizing where safe.
    pub fn check(&self, value: &Value) -> ShapeCheck {
        match (self.shape, value) {
            (FieldShape::List, Value::Array(_))
            | (FieldShape::Object, Value::Object(_))
            | (FieldShape::Text, Value::String(_)) => ShapeCheck::Ok(value.clone()),
            (FieldShape::Number, Value::Number(n)) => match n.as_f64() {
                Some(p) => normalize_probability(p, false),
                None => ShapeCheck::Mismatch,
            },
            (FieldShape::Number, Value::String(s)) => {
                let trimmed = s.trim();
                match trimmed.strip_suffix('%') {
                    Some(percent) => match percent.trim().parse::<f64>() {
                        Ok(p) if (0.0..=100.0).contains(&p) => coerced_number(p / 100.0),
                        _ => ShapeCheck::Mismatch,
                    },
                    None => match trimmed.parse::<f64>() {
                        Ok(p) => normalize_probability(p, true),
                        Err(_) => ShapeCheck::Mismatch,
                    },
                }
            }
            _ => ShapeCheck::Mismatch,
        }
    }
}

/// Probabilities in [0,1] pass; percentages in (1,100] are rescaled.
fn normalize_probability(p: f64, already_coerced: bool) -> ShapeCheck {
    let (value, coerced) = if (0.0..=1.0).contains(&p) {
        (p, already_coerced)
    } else if p > 1.0 && p <= 100.0 {
        (p / 100.0, true)
    } else {
        return ShapeCheck::Mismatch;
    };
    match Number::from_f64(value) {
        Some(n) if coerced => ShapeCheck::Coerced(Value::Number(n)),
        Some(n) => ShapeCheck::Ok(Value::Number(n)),
        None => ShapeCheck::Mismatch,
    }
}

/// An explicit percentage is always scaled, even below 1%.
fn coerced_number(value: f64) -> ShapeCheck {
    Number::from_f64(value)
        .map(|n| ShapeCheck::Coerced(Value::Number(n)))
        .unwrap_or(ShapeCheck::Mismatch)
}

/// Required fields of one analysis kind
#[derive(Debug)]
pub struct AnalysisSchema {
    pub kind: AnalysisKind,
    pub fields: &'static [FieldSpec],
}

static RIGHTS_AND_CASE_LAW: AnalysisSchema = AnalysisSchema {
    kind: AnalysisKind::RightsAndCaseLaw,
    fields: &[
        FieldSpec::list("rights_assessment", "right_violated").alias(&["rights_violations"]),
        FieldSpec::list("case_law_suggestions", "case_name").alias(&["relevant_cases"]),
        FieldSpec::object("winning_strategy"),
    ],
};

static DOCUMENT_RECOMMENDATIONS: AnalysisSchema = AnalysisSchema {
    kind: AnalysisKind::DocumentRecommendations,
    fields: &[FieldSpec::list("document_recommendations", "document_type")],
};

static INTERVIEW_ANALYSIS: AnalysisSchema = AnalysisSchema {
    kind: AnalysisKind::InterviewAnalysis,
    fields: &[
        FieldSpec::list("constitutional_violations", "violation_type"),
        FieldSpec::list("speedy_trial_violations", "violation_description"),
        FieldSpec::list("fruit_of_poisonous_tree", "initial_violation"),
        FieldSpec::list("systemic_bias_issues", "bias_type"),
        FieldSpec::object("defense_strategy"),
    ],
};

static COURT_SCRIPT: AnalysisSchema = AnalysisSchema {
    kind: AnalysisKind::CourtScript,
    fields: &[
        FieldSpec::text("script_title"),
        FieldSpec::list("preparation", "step"),
        FieldSpec::list("courtroom_entrance", "action"),
        FieldSpec::list("main_proceeding", "stage"),
        FieldSpec::list("asserting_rights", "right"),
        FieldSpec::list("potential_challenges", "challenge"),
        FieldSpec::list("conclusion", "action"),
    ],
};

static EVIDENCE_RELEVANCE: AnalysisSchema = AnalysisSchema {
    kind: AnalysisKind::EvidenceRelevance,
    fields: &[FieldSpec::list("evidence_analysis", "evidence_id")],
};

static EXHIBIT_ORGANIZATION: AnalysisSchema = AnalysisSchema {
    kind: AnalysisKind::ExhibitOrganization,
    fields: &[FieldSpec::list("exhibit_plan", "exhibit_group")],
};

static SUCCESS_PROBABILITY: AnalysisSchema = AnalysisSchema {
    kind: AnalysisKind::SuccessProbability,
    fields: &[
        FieldSpec::number("success_probability"),
        FieldSpec::text("confidence_level"),
        FieldSpec::plain_list("key_factors"),
        FieldSpec::plain_list("improvement_suggestions"),
    ],
};

static ADVANCED_STRATEGY: AnalysisSchema = AnalysisSchema {
    kind: AnalysisKind::AdvancedStrategy,
    fields: &[FieldSpec::object("winning_strategy")],
};

impl AnalysisSchema {
    pub fn for_kind(kind: AnalysisKind) -> &'static AnalysisSchema {
        match kind {
            AnalysisKind::RightsAndCaseLaw => &RIGHTS_AND_CASE_LAW,
            AnalysisKind::DocumentRecommendations => &DOCUMENT_RECOMMENDATIONS,
            AnalysisKind::InterviewAnalysis => &INTERVIEW_ANALYSIS,
            AnalysisKind::CourtScript => &COURT_SCRIPT,
            AnalysisKind::EvidenceRelevance => &EVIDENCE_RELEVANCE,
            AnalysisKind::ExhibitOrganization => &EXHIBIT_ORGANIZATION,
            AnalysisKind::SuccessProbability => &SUCCESS_PROBABILITY,
            AnalysisKind::AdvancedStrategy => &ADVANCED_STRATEGY,
        }
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Whether `key` is a field name or alias of this schema
    pub fn recognizes(&self, key: &str) -> bool {
        self.fields
            .iter()
            .any(|f| f.name == key || f.aliases.contains(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_kind_has_fields() {
        for kind in AnalysisKind::ALL {
            let schema = AnalysisSchema::for_kind(kind);
            assert_eq!(schema.kind, kind);
            assert!(!schema.fields.is_empty());
        }
    }

    #[test]
    fn test_aliases_recognized() {
        let schema = AnalysisSchema::for_kind(AnalysisKind::RightsAndCaseLaw);
        assert!(schema.recognizes("relevant_cases"));
        assert!(schema.recognizes("rights_assessment"));
        assert!(!schema.recognizes("document_recommendations"));
    }

    #[test]
    fn test_shape_checks() {
        let list = FieldSpec::list("x", "id");
        assert_eq!(list.check(&json!([])), ShapeCheck::Ok(json!([])));
        assert_eq!(list.check(&json!({})), ShapeCheck::Mismatch);

        let text = FieldSpec::text("t");
        assert_eq!(text.check(&json!(3)), ShapeCheck::Mismatch);
    }

    #[test]
    fn test_probability_rescaling() {
        let p = FieldSpec::number("success_probability");
        assert_eq!(p.check(&json!(0.4)), ShapeCheck::Ok(json!(0.4)));
        assert_eq!(p.check(&json!(65)), ShapeCheck::Coerced(json!(0.65)));
        assert_eq!(p.check(&json!("70%")), ShapeCheck::Coerced(json!(0.7)));
        assert_eq!(p.check(&json!(250)), ShapeCheck::Mismatch);
        assert_eq!(p.check(&json!(-0.1)), ShapeCheck::Mismatch);
        assert_eq!(p.check(&json!("likely")), ShapeCheck::Mismatch);
    }

    #[test]
    fn test_percent_suffix_always_scaled() {
        let p = FieldSpec::number("success_probability");
        assert_eq!(p.check(&json!("1%")), ShapeCheck::Coerced(json!(0.01)));
        assert_eq!(p.check(&json!("0.5%")), ShapeCheck::Coerced(json!(0.005)));
        assert_eq!(p.check(&json!(" 100 % ")), ShapeCheck::Coerced(json!(1.0)));
        assert_eq!(p.check(&json!("0.6")), ShapeCheck::Coerced(json!(0.6)));
        assert_eq!(p.check(&json!("120%")), ShapeCheck::Mismatch);
    }
}
