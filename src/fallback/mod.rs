//! Fallback Synthesis
//!
//! Deterministic, network-free construction of schema-valid analysis content
//! from the static knowledge base. Used when no provider is available and to
//! patch individual fields a provider left missing.
//!
//! Synthesis is total: every `(IssueCategory, AnalysisKind)` pair has a
//! defined path, and identical input always yields identical output.

mod fields;

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

use crate::ai::validation::{AnalysisSchema, ValidationReport};
use crate::types::{AnalysisKind, CaseContext};
use fields::CaseFacts;

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSynthesizer;

impl FallbackSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Full payload for `kind`, every required field populated.
    pub fn synthesize(&self, ctx: &CaseContext, kind: AnalysisKind) -> Value {
        let facts = CaseFacts::new(ctx);
        let payload: Map<String, Value> = AnalysisSchema::for_kind(kind)
            .field_names()
            .filter_map(|name| build_field(&facts, kind, name).map(|v| (name.to_string(), v)))
            .collect();
        Value::Object(payload)
    }

    /// One field of `kind`, or `None` when `field` is not part of its schema.
    pub fn synthesize_field(
        &self,
        ctx: &CaseContext,
        kind: AnalysisKind,
        field: &str,
    ) -> Option<Value> {
        build_field(&CaseFacts::new(ctx), kind, field)
    }

    /// Values for exactly the fields `report` lists as missing.
    pub fn synthesize_missing(
        &self,
        ctx: &CaseContext,
        kind: AnalysisKind,
        report: &ValidationReport,
    ) -> BTreeMap<String, Value> {
        if report.missing.is_empty() {
            return BTreeMap::new();
        }
        let facts = CaseFacts::new(ctx);
        let patched: BTreeMap<String, Value> = report
            .missing
            .iter()
            .filter_map(|&name| build_field(&facts, kind, name).map(|v| (name.to_string(), v)))
            .collect();
        debug!(kind = %kind, fields = ?patched.keys().collect::<Vec<_>>(), "Synthesized missing fields");
        patched
    }
}

fn build_field(facts: &CaseFacts, kind: AnalysisKind, field: &str) -> Option<Value> {
    use AnalysisKind::*;
    let value = match (kind, field) {
        (RightsAndCaseLaw, "rights_assessment") => fields::rights_assessment(facts),
        (RightsAndCaseLaw, "case_law_suggestions") => fields::case_law_suggestions(facts),
        (RightsAndCaseLaw, "winning_strategy") => fields::rights_winning_strategy(facts),

        (DocumentRecommendations, "document_recommendations") => {
            fields::document_recommendations(facts)
        }

        (InterviewAnalysis, "constitutional_violations") => fields::constitutional_violations(facts),
        (InterviewAnalysis, "speedy_trial_violations") => fields::speedy_trial_violations(facts),
        (InterviewAnalysis, "fruit_of_poisonous_tree") => fields::fruit_of_poisonous_tree(facts),
        (InterviewAnalysis, "systemic_bias_issues") => fields::systemic_bias_issues(facts),
        (InterviewAnalysis, "defense_strategy") => fields::defense_strategy(facts),

        (CourtScript, "script_title") => fields::script_title(facts),
        (CourtScript, "preparation") => fields::preparation(facts),
        (CourtScript, "courtroom_entrance") => fields::courtroom_entrance(facts),
        (CourtScript, "main_proceeding") => fields::main_proceeding(facts),
        (CourtScript, "asserting_rights") => fields::asserting_rights(facts),
        (CourtScript, "potential_challenges") => fields::potential_challenges(facts),
        (CourtScript, "conclusion") => fields::conclusion(facts),

        (EvidenceRelevance, "evidence_analysis") => fields::evidence_analysis(facts),
        (ExhibitOrganization, "exhibit_plan") => fields::exhibit_plan(facts),

        (SuccessProbability, "success_probability") => fields::success_probability(facts),
        (SuccessProbability, "confidence_level") => fields::confidence_level(facts),
        (SuccessProbability, "key_factors") => fields::key_factors(facts),
        (SuccessProbability, "improvement_suggestions") => fields::improvement_suggestions(facts),

        (AdvancedStrategy, "winning_strategy") => fields::advanced_winning_strategy(facts),

        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::validation::{ResponseValidator, is_placeholder, satisfies_schema};
    use crate::types::{ForumCategory, IssueCategory, ProceedingType};
    use proptest::prelude::*;
    use serde_json::json;

    fn car_search() -> CaseContext {
        CaseContext::new(
            "officer searched my car without a warrant",
            IssueCategory::Criminal,
            ForumCategory::State,
        )
    }

    #[test]
    fn test_every_schema_field_has_a_builder() {
        let ctx = car_search();
        for kind in AnalysisKind::ALL {
            for name in AnalysisSchema::for_kind(kind).field_names() {
                assert!(
                    FallbackSynthesizer::new()
                        .synthesize_field(&ctx, kind, name)
                        .is_some(),
                    "{kind}.{name}"
                );
            }
        }
    }

    #[test]
    fn test_total_over_categories_and_kinds() {
        let synth = FallbackSynthesizer::new();
        for issue in IssueCategory::ALL {
            for forum in [ForumCategory::State, ForumCategory::Tribal, ForumCategory::Other] {
                let ctx = CaseContext::new("something happened", issue, forum);
                for kind in AnalysisKind::ALL {
                    let payload = synth.synthesize(&ctx, kind);
                    assert!(satisfies_schema(kind, &payload), "{issue}/{forum:?}/{kind}");
                }
            }
        }
    }

    #[test]
    fn test_car_search_rights_scenario() {
        let payload =
            FallbackSynthesizer::new().synthesize(&car_search(), AnalysisKind::RightsAndCaseLaw);
        let rights = payload["rights_assessment"].as_array().unwrap();
        assert!(
            rights
                .iter()
                .any(|r| r["right_violated"].as_str().unwrap().contains("Fourth Amendment"))
        );
        assert_eq!(rights[0]["severity"], "High");

        let cases: Vec<&str> = payload["case_law_suggestions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["case_name"].as_str().unwrap())
            .collect();
        assert!(cases.contains(&"United States v. Jones"));
    }

    #[test]
    fn test_car_search_documents_scenario() {
        let payload = FallbackSynthesizer::new()
            .synthesize(&car_search(), AnalysisKind::DocumentRecommendations);
        let docs = payload["document_recommendations"].as_array().unwrap();
        assert_eq!(docs[0]["document_type"], "Discovery Request");
        let spec = AnalysisSchema::for_kind(AnalysisKind::DocumentRecommendations)
            .field("document_recommendations")
            .unwrap();
        assert!(!is_placeholder(spec, &payload["document_recommendations"]));
    }

    #[test]
    fn test_tribal_forum_adds_jurisdiction_motion() {
        let ctx = CaseContext::new("arrested on the reservation", IssueCategory::Criminal, ForumCategory::Tribal);
        let payload = FallbackSynthesizer::new().synthesize(&ctx, AnalysisKind::DocumentRecommendations);
        let docs = payload["document_recommendations"].as_array().unwrap();
        assert_eq!(
            docs.last().unwrap()["document_type"],
            "Motion to Determine Jurisdiction"
        );
    }

    #[test]
    fn test_synthesize_missing_only_patches_missing() {
        let validator = ResponseValidator::new();
        let provider_value = json!({
            "rights_assessment": [{"right_violated": "Fourth Amendment"}],
            "winning_strategy": {"primary_approach": "Suppress"}
        });
        let report =
            validator.validate_value(AnalysisKind::RightsAndCaseLaw, &provider_value, false);
        let patched = FallbackSynthesizer::new().synthesize_missing(
            &car_search(),
            AnalysisKind::RightsAndCaseLaw,
            &report,
        );
        assert_eq!(patched.keys().collect::<Vec<_>>(), vec!["case_law_suggestions"]);

        let full =
            FallbackSynthesizer::new().synthesize(&car_search(), AnalysisKind::RightsAndCaseLaw);
        assert_eq!(patched["case_law_suggestions"], full["case_law_suggestions"]);
    }

    #[test]
    fn test_unknown_field_is_none() {
        assert!(
            FallbackSynthesizer::new()
                .synthesize_field(&car_search(), AnalysisKind::CourtScript, "verdict")
                .is_none()
        );
    }

    #[test]
    fn test_court_script_follows_proceeding() {
        let ctx = car_search().with_proceeding(ProceedingType::BailHearing);
        let payload = FallbackSynthesizer::new().synthesize(&ctx, AnalysisKind::CourtScript);
        assert_eq!(payload["script_title"], "Court Appearance Script: Bail Hearing");
    }

    #[test]
    fn test_exhibit_groups_by_challenge() {
        let ctx = car_search().with_evidence([
            "bag found in car search",
            "recorded statement at the station",
            "phone seized at the scene",
        ]);
        let payload = FallbackSynthesizer::new().synthesize(&ctx, AnalysisKind::ExhibitOrganization);
        let plan = payload["exhibit_plan"].as_array().unwrap();
        assert_eq!(plan[0]["exhibit_group"], "A: Fourth Amendment violation");
        assert_eq!(plan[0]["evidence_items"], json!([1, 3]));
        assert_eq!(plan[1]["exhibit_group"], "B: Miranda violation");
    }

    fn issue_strategy() -> impl Strategy<Value = IssueCategory> {
        prop::sample::select(IssueCategory::ALL.to_vec())
    }

    fn kind_strategy() -> impl Strategy<Value = AnalysisKind> {
        prop::sample::select(AnalysisKind::ALL.to_vec())
    }

    fn forum_strategy() -> impl Strategy<Value = ForumCategory> {
        prop::sample::select(vec![
            ForumCategory::Federal,
            ForumCategory::State,
            ForumCategory::Municipal,
            ForumCategory::Tribal,
            ForumCategory::Administrative,
            ForumCategory::Other,
        ])
    }

    proptest! {
        #[test]
        fn prop_synthesis_is_deterministic_and_valid(
            description in "[a-zA-Z ,.]{1,200}",
            issue in issue_strategy(),
            forum in forum_strategy(),
            kind in kind_strategy(),
            evidence in prop::collection::vec("[a-z ]{1,40}", 0..4),
        ) {
            let ctx = CaseContext::new(description, issue, forum).with_evidence(evidence);
            let synth = FallbackSynthesizer::new();
            let first = synth.synthesize(&ctx, kind);
            let second = synth.synthesize(&ctx, kind);
            prop_assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
            prop_assert!(satisfies_schema(kind, &first));
        }
    }
}
