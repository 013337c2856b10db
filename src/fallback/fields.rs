//! Per-field builders
//!
//! One function per required field. Each reads only [`CaseFacts`] and static
//! knowledge, so a field built alone equals the same field built as part of a
//! full synthesis.

use serde_json::{Value, json};

use crate::knowledge::{
    BASE_PROBABILITY, DocumentStrategy, GENERAL_STRATEGY, KnowledgeBase, Precedent,
    RIGHTS_STRATEGY, RightMatch, StrategyPlan, StrategyTemplate, TERRY_V_OHIO,
    TRIBAL_CONSIDERATIONS, TRIBAL_JURISDICTION_MOTION, challenge_for, find_precedent,
    proceeding_guidance, success_factors,
};
use crate::types::{CaseContext, ForumCategory, ProceedingType};

/// Violations listed per right in a rights assessment
const VIOLATIONS_PER_RIGHT: usize = 2;

/// Precedents cited per right
const PRECEDENTS_PER_RIGHT: usize = 2;

/// Documents recommended per strategy stage
const DOCS_PER_STAGE: usize = 2;

/// Keyword hits at which a right is rated high severity
const HIGH_SEVERITY_HITS: usize = 2;

const DELAY_CUES: &[&str] = &["delay", "speedy", "months", "postpone", "continuance", "waiting"];

/// Everything derived from a case once per synthesis
pub(crate) struct CaseFacts<'a> {
    pub ctx: &'a CaseContext,
    pub rights: Vec<RightMatch>,
    pub plan: &'static StrategyPlan,
    pub description_lower: String,
}

impl<'a> CaseFacts<'a> {
    pub fn new(ctx: &'a CaseContext) -> Self {
        Self {
            ctx,
            rights: KnowledgeBase::relevant_rights(ctx),
            plan: KnowledgeBase::strategy(ctx),
            description_lower: ctx.description_lower(),
        }
    }

    fn is_tribal(&self) -> bool {
        self.ctx.forum_category == ForumCategory::Tribal
    }

    fn right_names(&self) -> Vec<&'static str> {
        self.rights.iter().map(|m| m.right.name()).collect()
    }

    fn leading_violation(&self) -> &'static str {
        self.rights
            .iter()
            .flat_map(|m| m.right.profile().common_violations.iter())
            .next()
            .copied()
            .unwrap_or("Procedural irregularity in case handling")
    }

    fn precedents(&self) -> Vec<&'static Precedent> {
        let cited: Vec<&'static Precedent> = self
            .rights
            .iter()
            .flat_map(|m| m.right.profile().precedents.iter().take(PRECEDENTS_PER_RIGHT))
            .collect();
        if cited.is_empty() {
            vec![&TERRY_V_OHIO]
        } else {
            cited
        }
    }

    fn mentions_delay(&self) -> bool {
        DELAY_CUES.iter().any(|c| self.description_lower.contains(c))
    }
}

fn severity(m: &RightMatch) -> &'static str {
    if m.hits >= HIGH_SEVERITY_HITS {
        "High"
    } else {
        "Medium"
    }
}

fn cite(name: &str) -> Vec<&'static str> {
    find_precedent(name).map(|p| vec![p.case_name]).unwrap_or_default()
}

// =============================================================================
// Rights and Case Law
// =============================================================================

pub(crate) fn rights_assessment(facts: &CaseFacts) -> Value {
    let entries: Vec<Value> = facts
        .rights
        .iter()
        .flat_map(|m| {
            let profile = m.right.profile();
            profile
                .common_violations
                .iter()
                .take(VIOLATIONS_PER_RIGHT)
                .map(move |violation| {
                    json!({
                        "right_violated": profile.name,
                        "explanation": violation,
                        "severity": severity(m),
                        "supporting_legal_principle": profile.key_principle,
                    })
                })
        })
        .collect();
    Value::Array(entries)
}

pub(crate) fn case_law_suggestions(facts: &CaseFacts) -> Value {
    let entries: Vec<Value> = facts
        .precedents()
        .into_iter()
        .map(|p| {
            json!({
                "case_name": p.case_name,
                "citation": p.citation,
                "year": p.year,
                "court": p.court,
                "relevance": p.application,
                "principles": p.holding,
                "strategic_application": p.application,
                "counter_arguments": "Be prepared to distinguish your case if the opposing party cites contrary precedent",
            })
        })
        .collect();
    Value::Array(entries)
}

fn strategy_object(template: &StrategyTemplate) -> serde_json::Map<String, Value> {
    let mut obj = serde_json::Map::new();
    obj.insert("primary_approach".into(), json!(template.primary_approach));
    obj.insert(
        "attack_defense_tactics".into(),
        json!(template.attack_defense_tactics),
    );
    obj.insert("procedural_motions".into(), json!(template.procedural_motions));
    obj.insert("evidence_challenges".into(), json!(template.evidence_challenges));
    obj.insert("hearing_objections".into(), json!(template.hearing_objections));
    obj.insert("timing_strategy".into(), json!(template.timing_strategy));
    obj
}

pub(crate) fn rights_winning_strategy(facts: &CaseFacts) -> Value {
    let mut obj = strategy_object(&RIGHTS_STRATEGY);
    obj.insert("focus_rights".into(), json!(facts.right_names()));
    Value::Object(obj)
}

// =============================================================================
// Advanced Strategy
// =============================================================================

pub(crate) fn advanced_winning_strategy(facts: &CaseFacts) -> Value {
    let mut obj = strategy_object(&GENERAL_STRATEGY);
    let defense_plan: Vec<Value> = facts
        .rights
        .iter()
        .map(|m| {
            let profile = m.right.profile();
            json!({
                "right": profile.name,
                "violations_to_check": profile.common_violations,
                "key_questions": profile.key_questions,
            })
        })
        .collect();
    let roadmap: Vec<&str> = facts.plan.documents().map(|d| d.document_type).collect();
    obj.insert("rights_defense_plan".into(), Value::Array(defense_plan));
    obj.insert("document_roadmap".into(), json!(roadmap));
    if facts.is_tribal() {
        obj.insert(
            "jurisdiction_considerations".into(),
            json!(TRIBAL_CONSIDERATIONS),
        );
    }
    Value::Object(obj)
}

// =============================================================================
// Document Recommendations
// =============================================================================

fn document_entry(doc: &DocumentStrategy) -> Value {
    json!({
        "document_type": doc.document_type,
        "rationale": doc.purpose,
        "strategic_guidance": doc.strategic_guidance,
        "key_elements": doc.key_elements,
        "timing": doc.timing,
        "importance": doc.importance,
        "impact": doc.impact,
    })
}

pub(crate) fn document_recommendations(facts: &CaseFacts) -> Value {
    let mut docs: Vec<&DocumentStrategy> = facts.plan.leading_documents(DOCS_PER_STAGE).collect();
    let has_jurisdiction_motion = docs
        .iter()
        .any(|d| d.document_type == TRIBAL_JURISDICTION_MOTION.document_type);
    if facts.is_tribal() && !has_jurisdiction_motion {
        docs.push(&TRIBAL_JURISDICTION_MOTION);
    }
    Value::Array(docs.into_iter().map(document_entry).collect())
}

// =============================================================================
// Interview Analysis
// =============================================================================

pub(crate) fn constitutional_violations(facts: &CaseFacts) -> Value {
    let entries: Vec<Value> = facts
        .rights
        .iter()
        .map(|m| {
            let profile = m.right.profile();
            let violation = profile.common_violations.first().copied().unwrap_or(profile.description);
            let case_law: Vec<&str> = profile
                .precedents
                .iter()
                .take(PRECEDENTS_PER_RIGHT)
                .map(|p| p.case_name)
                .collect();
            json!({
                "violation_type": format!("{} - {}", profile.name, violation),
                "description": format!("The facts described may indicate: {}", violation.to_lowercase()),
                "supporting_case_law": case_law,
                "recommended_action": format!("Raise the {} issue in a written motion", profile.name),
                "probability_of_success": severity(m),
            })
        })
        .collect();
    Value::Array(entries)
}

pub(crate) fn speedy_trial_violations(facts: &CaseFacts) -> Value {
    let (description, likelihood) = if facts.mentions_delay() {
        ("The case describes delay that may exceed speedy trial limits", "Medium")
    } else {
        (
            "Track elapsed time since arrest or filing against the applicable speedy trial limit",
            "Low",
        )
    };
    json!([{
        "violation_description": description,
        "jurisdiction_rule": "Check the statutory speedy trial deadline for this court",
        "supporting_case_law": cite("Barker v. Wingo"),
        "recommended_action": "Assert the right to a speedy trial on the record and move to dismiss if the limit passes",
        "probability_of_success": likelihood,
    }])
}

pub(crate) fn fruit_of_poisonous_tree(facts: &CaseFacts) -> Value {
    let tainted: Vec<String> = if facts.ctx.evidence.is_empty() {
        vec!["Evidence obtained after the initial violation".to_string()]
    } else {
        facts.ctx.evidence.clone()
    };
    json!([{
        "initial_violation": facts.leading_violation(),
        "tainted_evidence": tainted,
        "suppression_argument": "Evidence discovered by exploiting the initial violation must be excluded along with it",
        "supporting_case_law": cite("Wong Sun v. United States"),
    }])
}

pub(crate) fn systemic_bias_issues(_facts: &CaseFacts) -> Value {
    json!([{
        "bias_type": "Conflict of interest in legal representation",
        "description": "Appointed counsel funded by the same entity as the prosecution may face divided loyalties",
        "legal_basis": "Sixth Amendment right to effective assistance of counsel",
        "recommended_action": "Raise any conflict on the record and request independent counsel if warranted",
    }])
}

pub(crate) fn defense_strategy(facts: &CaseFacts) -> Value {
    let motions: Vec<&str> = facts
        .plan
        .leading_documents(1)
        .map(|d| d.document_type)
        .collect();
    let primary = facts
        .rights
        .first()
        .map(|m| format!("Focus on {} challenges", m.right.name()))
        .unwrap_or_else(|| GENERAL_STRATEGY.primary_approach.to_string());
    json!({
        "primary_approach": primary,
        "secondary_approach": "Simultaneously preserve speedy trial and discovery rights",
        "key_motions": motions,
        "filing_priority": "File evidence challenges first, then timing-based motions",
        "overall_assessment": "Strength depends on documenting each identified violation",
    })
}

// =============================================================================
// Court Script
// =============================================================================

fn proceeding(facts: &CaseFacts) -> ProceedingType {
    facts.ctx.proceeding_or_default()
}

pub(crate) fn script_title(facts: &CaseFacts) -> Value {
    json!(format!("Court Appearance Script: {}", proceeding(facts).label()))
}

pub(crate) fn preparation(facts: &CaseFacts) -> Value {
    let mut steps = vec![
        json!({
            "step": "Gather essential documents",
            "details": "Bring the charging document or complaint, all notices, and copies of any filed motions",
            "importance": "The court expects you to have your paperwork on hand",
        }),
        json!({
            "step": "Review the issues",
            "details": format!("Re-read the facts supporting: {}", facts.right_names().join(", ")),
            "importance": "Rights not raised may be waived",
        }),
    ];
    if facts.is_tribal() {
        steps.push(json!({
            "step": "Confirm the court's jurisdiction",
            "details": TRIBAL_CONSIDERATIONS.join("; "),
            "importance": "Jurisdiction determines which rules apply",
        }));
    }
    Value::Array(steps)
}

pub(crate) fn courtroom_entrance(_facts: &CaseFacts) -> Value {
    json!([
        {
            "action": "Arrive early and check in with the clerk",
            "explanation": "Late arrival can lead to a missed hearing",
        },
        {
            "action": "Address the judge as \"Your Honor\" and stand when speaking",
            "explanation": "Courtroom etiquette affects how arguments are received",
        },
    ])
}

pub(crate) fn main_proceeding(facts: &CaseFacts) -> Value {
    let guidance = proceeding_guidance(proceeding(facts));
    let mut stages = vec![json!({
        "stage": format!("{} begins", guidance.proceeding.label()),
        "what_to_expect": guidance.summary,
        "what_to_say": "Good morning, Your Honor. I am present and ready to proceed.",
        "what_to_do": "Stand when your case is called and state your name",
    })];
    stages.extend(guidance.considerations.iter().enumerate().map(|(i, item)| {
        json!({
            "stage": format!("Key point {}", i + 1),
            "what_to_expect": guidance.summary,
            "tips": item,
        })
    }));
    Value::Array(stages)
}

pub(crate) fn asserting_rights(facts: &CaseFacts) -> Value {
    let entries: Vec<Value> = facts
        .rights
        .iter()
        .map(|m| {
            let profile = m.right.profile();
            json!({
                "right": profile.name,
                "when_to_assert": "At the first opportunity the court gives you to speak",
                "what_to_say": format!("Your Honor, I wish to assert my {} and preserve this issue for the record.", profile.name),
                "possible_responses": "If the court defers the issue, ask that your objection be noted on the record",
            })
        })
        .collect();
    Value::Array(entries)
}

pub(crate) fn potential_challenges(facts: &CaseFacts) -> Value {
    json!([
        {
            "challenge": "The opposing party disputes the facts",
            "how_to_handle": "Point to specific documents or testimony supporting your account",
            "fallback_strategy": "Ask for time to submit supporting evidence in writing",
        },
        {
            "challenge": format!("The court questions whether {} occurred", facts.leading_violation().to_lowercase()),
            "how_to_handle": "Summarize the facts and cite the supporting precedent",
            "fallback_strategy": "Request a separate evidentiary hearing on the issue",
        },
    ])
}

pub(crate) fn conclusion(_facts: &CaseFacts) -> Value {
    json!([{
        "action": "Confirm next dates and deadlines before leaving",
        "what_to_say": "Thank you, Your Honor.",
        "next_steps": "Write down every date and order announced and calendar each deadline",
    }])
}

// =============================================================================
// Evidence
// =============================================================================

/// Evidence items as (1-based id, description); the narrative stands in
/// when the case lists no evidence.
fn evidence_items(facts: &CaseFacts) -> Vec<(usize, String)> {
    if facts.ctx.evidence.is_empty() {
        vec![(1, "Facts described in the case narrative".to_string())]
    } else {
        facts
            .ctx
            .evidence
            .iter()
            .enumerate()
            .map(|(i, e)| (i + 1, e.clone()))
            .collect()
    }
}

pub(crate) fn evidence_analysis(facts: &CaseFacts) -> Value {
    let entries: Vec<Value> = evidence_items(facts)
        .into_iter()
        .map(|(id, description)| {
            let challenge = challenge_for(&description.to_lowercase());
            let suppressible = if challenge.ground == "Chain of custody" {
                "Low chance"
            } else {
                "Medium chance"
            };
            json!({
                "evidence_id": id,
                "description": description,
                "suppressible": suppressible,
                "suppression_basis": challenge.ground,
                "case_precedents": challenge.precedents,
                "suppression_motion_language": challenge.strategy,
                "strategic_value": "Review how this item connects to the rest of the evidence",
            })
        })
        .collect();
    Value::Array(entries)
}

pub(crate) fn exhibit_plan(facts: &CaseFacts) -> Value {
    // Groups keep first-seen order of their challenge ground
    let mut groups: Vec<(&'static str, &'static str, Vec<usize>)> = Vec::new();
    for (id, description) in evidence_items(facts) {
        let challenge = challenge_for(&description.to_lowercase());
        match groups.iter_mut().find(|(ground, _, _)| *ground == challenge.ground) {
            Some((_, _, ids)) => ids.push(id),
            None => groups.push((challenge.ground, challenge.strategy, vec![id])),
        }
    }

    let entries: Vec<Value> = groups
        .into_iter()
        .zip('A'..='Z')
        .map(|((ground, strategy, ids), letter)| {
            json!({
                "exhibit_group": format!("{}: {}", letter, ground),
                "strategic_purpose": strategy,
                "evidence_items": ids,
                "presentation_order": "As listed",
                "introduction_strategy": "Introduce each item with the witness or record that authenticates it",
            })
        })
        .collect();
    Value::Array(entries)
}

// =============================================================================
// Success Probability
// =============================================================================

pub(crate) fn success_probability(_facts: &CaseFacts) -> Value {
    json!(BASE_PROBABILITY)
}

pub(crate) fn confidence_level(_facts: &CaseFacts) -> Value {
    json!("Medium")
}

pub(crate) fn key_factors(facts: &CaseFacts) -> Value {
    json!(success_factors(facts.ctx.issue_category).key_factors)
}

pub(crate) fn improvement_suggestions(facts: &CaseFacts) -> Value {
    json!(success_factors(facts.ctx.issue_category).improvement_suggestions)
}
