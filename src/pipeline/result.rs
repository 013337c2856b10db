//! Field accumulation and the finished result of one orchestrator run

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::OrchestratorState;
use crate::ai::provider::ProviderResponse;
use crate::ai::validation::{AnalysisSchema, ValidationReport};
use crate::constants::confidence;
use crate::storage::AnalysisDraft;
use crate::types::{AnalysisKind, FieldSource};

#[derive(Debug, Clone)]
struct CollectedField {
    value: Value,
    source: FieldSource,
    repaired: bool,
}

impl CollectedField {
    fn confidence(&self) -> f64 {
        match (self.source, self.repaired) {
            (FieldSource::Fallback, _) => confidence::FALLBACK,
            (_, true) => confidence::PROVIDER_REPAIRED,
            (_, false) => confidence::PROVIDER,
        }
    }
}

/// Satisfied fields gathered across providers and fallback.
///
/// The first source to satisfy a field wins; later sources only fill gaps.
#[derive(Debug, Clone)]
pub(crate) struct FieldCollector {
    kind: AnalysisKind,
    fields: BTreeMap<String, CollectedField>,
}

impl FieldCollector {
    pub fn new(kind: AnalysisKind) -> Self {
        Self {
            kind,
            fields: BTreeMap::new(),
        }
    }

    /// Take the satisfied fields of `report` that are still missing.
    /// Returns the names taken.
    pub fn absorb(&mut self, report: &ValidationReport, source: FieldSource) -> Vec<String> {
        let mut taken = Vec::new();
        for (name, value) in &report.satisfied {
            if self.fields.contains_key(name) {
                continue;
            }
            self.fields.insert(
                name.clone(),
                CollectedField {
                    value: value.clone(),
                    source,
                    repaired: report.was_repaired,
                },
            );
            taken.push(name.clone());
        }
        taken
    }

    /// Fill gaps with locally synthesized values
    pub fn patch(&mut self, synthesized: BTreeMap<String, Value>) {
        for (name, value) in synthesized {
            self.fields.entry(name).or_insert(CollectedField {
                value,
                source: FieldSource::Fallback,
                repaired: false,
            });
        }
    }

    /// Required fields not yet satisfied, in schema order
    pub fn missing(&self) -> Vec<&'static str> {
        AnalysisSchema::for_kind(self.kind)
            .field_names()
            .filter(|name| !self.fields.contains_key(*name))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// The accumulated state expressed as a validation report
    pub fn as_report(&self) -> ValidationReport {
        let mut report = ValidationReport::all_missing(self.kind);
        report.missing = self.missing();
        report.satisfied = self
            .fields
            .iter()
            .map(|(name, f)| (name.clone(), f.value.clone()))
            .collect();
        report
    }

    /// Mean per-field confidence over the required fields, in [0, 1]
    pub fn confidence(&self) -> f64 {
        let schema = AnalysisSchema::for_kind(self.kind);
        let total: f64 = schema
            .field_names()
            .map(|name| self.fields.get(name).map_or(0.0, CollectedField::confidence))
            .sum();
        (total / schema.fields.len() as f64).clamp(0.0, 1.0)
    }

    pub fn finish(
        self,
        trace: Vec<OrchestratorState>,
        attempts: Vec<ProviderResponse>,
    ) -> ValidatedResult {
        let confidence_score = self.confidence();
        let sources = self
            .fields
            .iter()
            .map(|(name, f)| (name.clone(), f.source))
            .collect();
        let payload: Map<String, Value> = self
            .fields
            .into_iter()
            .map(|(name, f)| (name, f.value))
            .collect();

        ValidatedResult {
            kind: self.kind,
            payload: Value::Object(payload),
            sources,
            confidence_score,
            trace,
            attempts,
        }
    }
}

/// A payload satisfying every required field of its kind
#[derive(Debug, Clone)]
pub struct ValidatedResult {
    pub kind: AnalysisKind,
    pub payload: Value,
    pub sources: BTreeMap<String, FieldSource>,
    pub confidence_score: f64,
    /// States visited, `Init` through `Complete`
    pub trace: Vec<OrchestratorState>,
    /// Provider attempts of this run; diagnostics only
    pub attempts: Vec<ProviderResponse>,
}

impl ValidatedResult {
    pub fn fields_from(&self, source: FieldSource) -> Vec<&str> {
        self.sources
            .iter()
            .filter(|(_, s)| **s == source)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn into_draft(self) -> AnalysisDraft {
        AnalysisDraft {
            payload: self.payload,
            confidence_score: self.confidence_score,
            sources: self.sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::validation::ResponseValidator;
    use serde_json::json;

    fn report(value: Value, repaired: bool) -> ValidationReport {
        ResponseValidator::new().validate_value(AnalysisKind::RightsAndCaseLaw, &value, repaired)
    }

    #[test]
    fn test_first_source_wins() {
        let mut collector = FieldCollector::new(AnalysisKind::RightsAndCaseLaw);
        let taken = collector.absorb(
            &report(json!({"winning_strategy": {"primary_approach": "A"}}), false),
            FieldSource::Primary,
        );
        assert_eq!(taken, vec!["winning_strategy"]);

        let taken = collector.absorb(
            &report(
                json!({
                    "winning_strategy": {"primary_approach": "B"},
                    "case_law_suggestions": [{"case_name": "Terry v. Ohio"}]
                }),
                false,
            ),
            FieldSource::Secondary,
        );
        assert_eq!(taken, vec!["case_law_suggestions"]);
        assert_eq!(collector.missing(), vec!["rights_assessment"]);

        let result = collector.finish(Vec::new(), Vec::new());
        assert_eq!(result.payload["winning_strategy"]["primary_approach"], "A");
        assert_eq!(result.sources["case_law_suggestions"], FieldSource::Secondary);
    }

    #[test]
    fn test_confidence_is_mean_of_fields() {
        let mut collector = FieldCollector::new(AnalysisKind::RightsAndCaseLaw);
        collector.absorb(
            &report(json!({"winning_strategy": {"primary_approach": "A"}}), false),
            FieldSource::Primary,
        );
        collector.absorb(
            &report(json!({"case_law_suggestions": [{"case_name": "X"}]}), true),
            FieldSource::Secondary,
        );
        let mut fallback = BTreeMap::new();
        fallback.insert("rights_assessment".to_string(), json!([{"right_violated": "Y"}]));
        collector.patch(fallback);

        let expected = (0.85 + 0.80 + 0.60) / 3.0;
        assert!((collector.confidence() - expected).abs() < 1e-9);
        assert!(collector.is_complete());
    }

    #[test]
    fn test_patch_never_overwrites() {
        let mut collector = FieldCollector::new(AnalysisKind::AdvancedStrategy);
        collector.absorb(
            &report(json!({"winning_strategy": {"primary_approach": "A"}}), false),
            FieldSource::Primary,
        );
        let mut fallback = BTreeMap::new();
        fallback.insert("winning_strategy".to_string(), json!({"primary_approach": "Z"}));
        collector.patch(fallback);

        let result = collector.finish(Vec::new(), Vec::new());
        assert_eq!(result.payload["winning_strategy"]["primary_approach"], "A");
        assert!(result.fields_from(FieldSource::Fallback).is_empty());
    }

    #[test]
    fn test_as_report_lists_missing() {
        let collector = FieldCollector::new(AnalysisKind::CourtScript);
        let report = collector.as_report();
        assert_eq!(report.missing.len(), 7);
        assert!(report.satisfied.is_empty());
        assert_eq!(collector.confidence(), 0.0);
    }
}
