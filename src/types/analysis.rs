//! Analysis kinds and persisted analysis records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::error::{CaseError, Result};
use super::utils::ParseWithDefault;

/// Category of structured output a caller can request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    RightsAndCaseLaw,
    DocumentRecommendations,
    InterviewAnalysis,
    CourtScript,
    EvidenceRelevance,
    ExhibitOrganization,
    SuccessProbability,
    AdvancedStrategy,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 8] = [
        Self::RightsAndCaseLaw,
        Self::DocumentRecommendations,
        Self::InterviewAnalysis,
        Self::CourtScript,
        Self::EvidenceRelevance,
        Self::ExhibitOrganization,
        Self::SuccessProbability,
        Self::AdvancedStrategy,
    ];

    /// Stable persistence key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RightsAndCaseLaw => "rights_and_case_law",
            Self::DocumentRecommendations => "document_recommendations",
            Self::InterviewAnalysis => "interview_analysis",
            Self::CourtScript => "court_script",
            Self::EvidenceRelevance => "evidence_relevance",
            Self::ExhibitOrganization => "exhibit_organization",
            Self::SuccessProbability => "success_probability",
            Self::AdvancedStrategy => "advanced_strategy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::RightsAndCaseLaw => "Rights & Case Law",
            Self::DocumentRecommendations => "Document Recommendations",
            Self::InterviewAnalysis => "Interview Analysis",
            Self::CourtScript => "Court Script",
            Self::EvidenceRelevance => "Evidence Relevance",
            Self::ExhibitOrganization => "Exhibit Organization",
            Self::SuccessProbability => "Success Probability",
            Self::AdvancedStrategy => "Advanced Strategy",
        }
    }

    /// Kinds whose prompts need the case's evidence list
    pub fn uses_evidence(&self) -> bool {
        matches!(self, Self::EvidenceRelevance | Self::ExhibitOrganization)
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = CaseError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == key)
            .ok_or_else(|| CaseError::input("kind", format!("unknown analysis kind '{}'", s.trim())))
    }
}

/// Where a field of a stored payload came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    Primary,
    Secondary,
    Fallback,
}

impl FieldSource {
    pub fn is_provider(&self) -> bool {
        !matches!(self, Self::Fallback)
    }
}

impl ParseWithDefault for FieldSource {
    fn type_name() -> &'static str {
        "FieldSource"
    }

    fn default_value() -> Self {
        FieldSource::Fallback
    }

    fn try_parse(s: &str) -> Option<Self> {
        match s {
            "primary" => Some(FieldSource::Primary),
            "secondary" => Some(FieldSource::Secondary),
            "fallback" => Some(FieldSource::Fallback),
            _ => None,
        }
    }
}

// =============================================================================
// StoredAnalysis
// =============================================================================

/// The current persisted analysis for one `(case_id, kind)` key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredAnalysis {
    pub id: String,
    pub case_id: i64,
    pub kind: AnalysisKind,
    /// 1 on first generation, incremented on each supersession
    pub version: u32,
    /// Plain-text digest of the payload
    pub content: String,
    pub structured_payload: Value,
    pub confidence_score: f64,
    pub sources: BTreeMap<String, FieldSource>,
    pub generated_at: DateTime<Utc>,
}

impl StoredAnalysis {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.structured_payload.get(name)
    }

    pub fn source_of(&self, field: &str) -> Option<FieldSource> {
        self.sources.get(field).copied()
    }

    /// True when no provider contributed any field
    pub fn is_fallback_only(&self) -> bool {
        self.sources.values().all(|s| *s == FieldSource::Fallback)
    }

    pub fn fallback_fields(&self) -> Vec<&str> {
        self.sources
            .iter()
            .filter(|(_, s)| **s == FieldSource::Fallback)
            .map(|(f, _)| f.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_keys_round_trip() {
        for kind in AnalysisKind::ALL {
            assert_eq!(kind.as_str().parse::<AnalysisKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_accepts_kebab_case() {
        assert_eq!(
            "rights-and-case-law".parse::<AnalysisKind>().unwrap(),
            AnalysisKind::RightsAndCaseLaw
        );
        assert!("horoscope".parse::<AnalysisKind>().is_err());
    }

    #[test]
    fn test_field_source_parse_default() {
        assert_eq!(FieldSource::parse_or_default("secondary"), FieldSource::Secondary);
        assert_eq!(FieldSource::parse_or_default("garbage"), FieldSource::Fallback);
    }

    #[test]
    fn test_fallback_only() {
        let mut sources = BTreeMap::new();
        sources.insert("a".to_string(), FieldSource::Fallback);
        sources.insert("b".to_string(), FieldSource::Primary);
        let analysis = StoredAnalysis {
            id: "x".into(),
            case_id: 1,
            kind: AnalysisKind::AdvancedStrategy,
            version: 1,
            content: String::new(),
            structured_payload: json!({"a": 1, "b": 2}),
            confidence_score: 0.7,
            sources,
            generated_at: Utc::now(),
        };
        assert!(!analysis.is_fallback_only());
        assert_eq!(analysis.fallback_fields(), vec!["a"]);
        assert_eq!(analysis.source_of("b"), Some(FieldSource::Primary));
        assert_eq!(analysis.field("a"), Some(&json!(1)));
    }
}
