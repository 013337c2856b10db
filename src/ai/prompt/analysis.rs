//! Per-kind analysis prompts
//!
//! Renders a [`CaseContext`] into the system and user halves sent to a
//! provider. The user half embeds the task for the kind, issue-category
//! guidance, capped knowledge-base context and a JSON example of the
//! required fields. Rendering is pure: identical input, identical prompt.

use serde_json::{Map, Value, json};
use std::fmt::Write;

use super::PromptBuilder;
use crate::ai::provider::AnalysisPrompt;
use crate::ai::validation::{AnalysisSchema, FieldShape, FieldSpec, PLACEHOLDER_MARKERS};
use crate::constants::prompt as prompt_constants;
use crate::knowledge::{KnowledgeBase, TRIBAL_CONSIDERATIONS};
use crate::types::{AnalysisKind, CaseContext, ForumCategory, IssueCategory, truncate_chars};

/// Builds provider prompts for analysis kinds
#[derive(Debug, Clone, Copy)]
pub struct AnalysisPromptBuilder {
    context_cap: usize,
    description_cap: usize,
}

impl Default for AnalysisPromptBuilder {
    fn default() -> Self {
        Self::new(prompt_constants::CONTEXT_CAP_CHARS)
    }
}

impl AnalysisPromptBuilder {
    pub fn new(context_cap: usize) -> Self {
        Self {
            context_cap,
            description_cap: prompt_constants::DESCRIPTION_CAP_CHARS,
        }
    }

    pub fn with_description_cap(mut self, cap: usize) -> Self {
        self.description_cap = cap;
        self
    }

    /// Prompt asking for every required field of `kind`
    pub fn build(&self, ctx: &CaseContext, kind: AnalysisKind) -> AnalysisPrompt {
        let schema = AnalysisSchema::for_kind(kind);
        self.render(ctx, kind, schema.fields.iter().collect())
    }

    /// Prompt asking only for `fields` of `kind`.
    ///
    /// Names outside the kind's schema are ignored; an empty selection falls
    /// back to the full schema.
    pub fn build_for_fields(
        &self,
        ctx: &CaseContext,
        kind: AnalysisKind,
        fields: &[&str],
    ) -> AnalysisPrompt {
        let schema = AnalysisSchema::for_kind(kind);
        let selected: Vec<&FieldSpec> = schema
            .fields
            .iter()
            .filter(|f| fields.contains(&f.name))
            .collect();
        if selected.is_empty() {
            return self.build(ctx, kind);
        }
        self.render(ctx, kind, selected)
    }

    fn render(&self, ctx: &CaseContext, kind: AnalysisKind, fields: Vec<&FieldSpec>) -> AnalysisPrompt {
        let field_names: Vec<&str> = fields.iter().map(|f| f.name).collect();
        let system = PromptBuilder::new()
            .role("legal analyst", &format!("{} for self-represented litigants", kind.label()))
            .focus(
                &field_names.join(", "),
                [
                    "Respond with a single JSON object and nothing else",
                    "Use exactly the top-level keys shown in the output format",
                    "Base every statement on the case facts provided",
                ],
            )
            .anti_patterns(&PLACEHOLDER_MARKERS[..2], &["Concrete entries drawn from the case facts"])
            .build();

        let mut user = PromptBuilder::new()
            .context_item("Issue category", ctx.issue_category.label())
            .context_item("Forum", ctx.forum_category.label())
            .context_item("Description", &truncate_chars(ctx.description.trim(), self.description_cap));
        if kind == AnalysisKind::CourtScript {
            user = user.context_item("Proceeding", ctx.proceeding_or_default().label());
        }

        let user = user
            .section("Evidence", &render_evidence(ctx, kind))
            .objectives(task_objectives(kind).iter().copied())
            .section("Category Guidance", category_guidance(ctx.issue_category))
            .section("Jurisdiction", &tribal_note(ctx.forum_category))
            .section(
                "Reference Knowledge",
                &KnowledgeBase::prompt_context(ctx, kind, self.context_cap),
            )
            .section("Output Format", "Return JSON matching this structure:")
            .code("json", &schema_example(&fields))
            .build();

        AnalysisPrompt::new(system, user)
    }
}

fn render_evidence(ctx: &CaseContext, kind: AnalysisKind) -> String {
    if !kind.uses_evidence() {
        return String::new();
    }
    let mut out = String::new();
    let shown = ctx.evidence.iter().take(prompt_constants::MAX_EVIDENCE_ITEMS);
    for (i, item) in shown.enumerate() {
        let item = truncate_chars(item.trim(), prompt_constants::EVIDENCE_ITEM_CAP_CHARS);
        let _ = writeln!(out, "{}. {}", i + 1, item);
    }
    let hidden = ctx
        .evidence
        .len()
        .saturating_sub(prompt_constants::MAX_EVIDENCE_ITEMS);
    if hidden > 0 {
        let _ = writeln!(out, "({} more items not shown)", hidden);
    }
    out.trim_end().to_string()
}

fn tribal_note(forum: ForumCategory) -> String {
    if forum != ForumCategory::Tribal {
        return String::new();
    }
    let mut out = String::from("The case is before a tribal forum. Address jurisdiction first:\n");
    for item in TRIBAL_CONSIDERATIONS {
        let _ = writeln!(out, "- {}", item);
    }
    out.trim_end().to_string()
}

fn task_objectives(kind: AnalysisKind) -> &'static [&'static str] {
    match kind {
        AnalysisKind::RightsAndCaseLaw => &[
            "Identify each right that may have been violated and rate its severity",
            "Suggest case law with citation, year, court and how to apply it",
            "Outline a winning strategy with motions, evidence challenges and timing",
        ],
        AnalysisKind::DocumentRecommendations => &[
            "Recommend the documents to file, in filing order",
            "Give the rationale, key elements, timing and importance of each",
        ],
        AnalysisKind::InterviewAnalysis => &[
            "List constitutional violations suggested by the facts",
            "Check for speedy trial problems",
            "Trace evidence that may be fruit of the poisonous tree",
            "Note systemic bias or conflict issues",
            "Summarize a defense strategy with key motions and filing priority",
        ],
        AnalysisKind::CourtScript => &[
            "Write a step-by-step script for the proceeding",
            "Cover preparation, courtroom entrance, the main proceeding, asserting rights, likely challenges and the close",
        ],
        AnalysisKind::EvidenceRelevance => &[
            "Assess each evidence item for relevance and suppressibility",
            "Give the suppression basis and supporting precedent per item",
        ],
        AnalysisKind::ExhibitOrganization => &[
            "Group the evidence items into lettered exhibits",
            "Give the purpose, presentation order and introduction strategy per group",
        ],
        AnalysisKind::SuccessProbability => &[
            "Estimate the probability of a favorable outcome as a number between 0 and 1",
            "State a confidence level, the key factors and concrete improvement suggestions",
        ],
        AnalysisKind::AdvancedStrategy => &[
            "Build a winning strategy covering approach, tactics, procedural motions, evidence challenges, hearing objections and timing",
        ],
    }
}

fn category_guidance(issue: IssueCategory) -> &'static str {
    match issue {
        IssueCategory::Criminal => {
            "Criminal matter. Focus on search and seizure, custodial statements, right to counsel, speedy trial and bail. Prefer suppression and discovery motions."
        }
        IssueCategory::Civil | IssueCategory::Housing => {
            "Civil matter. Focus on due process, notice and opportunity to be heard, burden of proof and available remedies."
        }
        IssueCategory::PersonalInjury => {
            "Personal injury matter. Focus on duty, breach, causation and damages, and on preserving evidence of the injury."
        }
        IssueCategory::Contract => {
            "Contract matter. Focus on formation, the terms at issue, performance and breach, and the measure of damages."
        }
        IssueCategory::Family => {
            "Family matter. Focus on the best interests of any child, parental rights, property division and support."
        }
        IssueCategory::Bankruptcy => {
            "Bankruptcy matter. Focus on the automatic stay, dischargeability of debts and available exemptions."
        }
        IssueCategory::Immigration => {
            "Immigration matter. Focus on due process in removal, eligibility for relief such as asylum, and detention review."
        }
        IssueCategory::Other => {
            "General matter. Focus on procedural deadlines, the elements of each claim and the remedies available."
        }
    }
}

fn example_value(spec: &FieldSpec) -> Value {
    match spec.shape {
        FieldShape::List => match spec.identity {
            Some(identity) => {
                let mut entry = Map::new();
                entry.insert(identity.to_string(), json!("..."));
                entry.insert("details".to_string(), json!("..."));
                Value::Array(vec![Value::Object(entry)])
            }
            None => json!(["..."]),
        },
        FieldShape::Object => json!({"primary_approach": "...", "details": "..."}),
        FieldShape::Text => json!("..."),
        FieldShape::Number => json!(0.5),
    }
}

fn schema_example(fields: &[&FieldSpec]) -> String {
    let example: Map<String, Value> = fields
        .iter()
        .map(|f| (f.name.to_string(), example_value(f)))
        .collect();
    serde_json::to_string_pretty(&Value::Object(example)).unwrap_or_else(|_| "{}".to_string())
}
