//! Static Legal Knowledge Base
//!
//! Read-only rule content shared by prompt construction and fallback
//! synthesis:
//! - Rights profiles with keyword tables and precedents ([`rights`])
//! - Document strategies by case type ([`documents`])
//! - Proceeding guidance, evidence challenges and outcome factors ([`guidance`])
//!
//! Everything here is `'static` data behind exhaustive matches, so lookups
//! cannot fail and output is identical across runs.

pub mod documents;
pub mod guidance;
pub mod rights;

pub use documents::{
    DocumentStrategy, StrategyPlan, StrategyStage, TRIBAL_CONSIDERATIONS,
    TRIBAL_JURISDICTION_MOTION, strategy_plan,
};
pub use guidance::{
    BASE_PROBABILITY, EVIDENCE_CHALLENGES, EvidenceChallenge, GENERAL_STRATEGY,
    ProceedingGuidance, RIGHTS_STRATEGY, StrategyTemplate, SuccessFactors, challenge_for,
    proceeding_guidance, success_factors,
};
pub use rights::{
    Precedent, RightCategory, RightMatch, RightProfile, TERRY_V_OHIO, candidate_rights, classify,
    default_rights, find_precedent,
};

use std::fmt::Write;

use crate::types::{AnalysisKind, CaseContext, ForumCategory, capitalize_first, truncate_chars};

/// Documents taken from each strategy stage when rendering context
const DOCS_PER_STAGE: usize = 2;

/// Violations listed per right when rendering context
const VIOLATIONS_PER_RIGHT: usize = 3;

/// Entry point to the static rule base
pub struct KnowledgeBase;

impl KnowledgeBase {
    /// Rights relevant to a case, in table order
    pub fn relevant_rights(ctx: &CaseContext) -> Vec<RightMatch> {
        classify(ctx.issue_category, &ctx.description)
    }

    pub fn strategy(ctx: &CaseContext) -> &'static StrategyPlan {
        strategy_plan(ctx.issue_category, ctx.forum_category)
    }

    /// Render knowledge relevant to `kind` as prompt context, capped at
    /// `cap` characters with a trailing `...` when cut.
    pub fn prompt_context(ctx: &CaseContext, kind: AnalysisKind, cap: usize) -> String {
        let rights = Self::relevant_rights(ctx);
        let mut out = String::new();

        out.push_str("Relevant rights:\n");
        for m in &rights {
            let profile = m.right.profile();
            let violations = profile
                .common_violations
                .iter()
                .take(VIOLATIONS_PER_RIGHT)
                .copied()
                .collect::<Vec<_>>()
                .join("; ");
            let _ = writeln!(
                out,
                "- {}: {}. Common violations: {}",
                profile.name, profile.description, violations
            );
        }

        match kind {
            AnalysisKind::RightsAndCaseLaw
            | AnalysisKind::InterviewAnalysis
            | AnalysisKind::SuccessProbability
            | AnalysisKind::AdvancedStrategy => {
                render_precedents(&mut out, &rights);
            }
            AnalysisKind::DocumentRecommendations => {
                render_strategy(&mut out, Self::strategy(ctx));
            }
            AnalysisKind::CourtScript => {
                let guidance = proceeding_guidance(ctx.proceeding_or_default());
                let _ = writeln!(
                    out,
                    "\n{} guidance: {}",
                    guidance.proceeding.label(),
                    guidance.summary
                );
                for item in guidance.considerations {
                    let _ = writeln!(out, "- {}", item);
                }
            }
            AnalysisKind::EvidenceRelevance | AnalysisKind::ExhibitOrganization => {
                out.push_str("\nAdmissibility challenges:\n");
                for c in &EVIDENCE_CHALLENGES {
                    let _ = writeln!(out, "- {}: {}", c.ground, c.strategy);
                }
                render_precedents(&mut out, &rights);
            }
        }

        if ctx.forum_category == ForumCategory::Tribal {
            out.push_str("\nTribal forum considerations:\n");
            for item in TRIBAL_CONSIDERATIONS {
                let _ = writeln!(out, "- {}", item);
            }
        }

        truncate_chars(out.trim_end(), cap)
    }
}

fn render_precedents(out: &mut String, rights: &[RightMatch]) {
    let precedents: Vec<&Precedent> = rights
        .iter()
        .flat_map(|m| m.right.profile().precedents.iter())
        .collect();
    if precedents.is_empty() {
        return;
    }
    out.push_str("\nPrecedents:\n");
    for p in precedents {
        let _ = writeln!(
            out,
            "- {}, {} ({}): {}",
            p.case_name, p.citation, p.year, p.holding
        );
    }
}

fn render_strategy(out: &mut String, plan: &StrategyPlan) {
    for stage in plan.stages {
        let _ = writeln!(out, "\n{} stage:", capitalize_first(&stage.name.replace('_', " ")));
        for doc in stage.documents.iter().take(DOCS_PER_STAGE) {
            let _ = writeln!(out, "- {}: {} ({})", doc.document_type, doc.purpose, doc.timing);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IssueCategory;

    fn car_search() -> CaseContext {
        CaseContext::new(
            "Officer searched my car without a warrant",
            IssueCategory::Criminal,
            ForumCategory::State,
        )
    }

    #[test]
    fn test_prompt_context_is_deterministic() {
        let a = KnowledgeBase::prompt_context(&car_search(), AnalysisKind::RightsAndCaseLaw, 1500);
        let b = KnowledgeBase::prompt_context(&car_search(), AnalysisKind::RightsAndCaseLaw, 1500);
        assert_eq!(a, b);
        assert!(a.contains("Fourth Amendment Rights"));
        assert!(a.contains("United States v. Jones"));
    }

    #[test]
    fn test_prompt_context_is_capped() {
        let text = KnowledgeBase::prompt_context(&car_search(), AnalysisKind::RightsAndCaseLaw, 100);
        assert!(text.ends_with("..."));
        assert_eq!(text.chars().count(), 103);
    }

    #[test]
    fn test_document_context_lists_stages() {
        let text = KnowledgeBase::prompt_context(
            &car_search(),
            AnalysisKind::DocumentRecommendations,
            5000,
        );
        assert!(text.contains("Initial stage:"));
        assert!(text.contains("- Discovery Request:"));
        assert!(!text.contains("Precedents:"));
    }

    #[test]
    fn test_tribal_forum_adds_considerations() {
        let ctx = CaseContext::new(
            "Tribal enterprise never paid the invoice",
            IssueCategory::Contract,
            ForumCategory::Tribal,
        );
        let text = KnowledgeBase::prompt_context(&ctx, AnalysisKind::AdvancedStrategy, 5000);
        assert!(text.contains("Tribal forum considerations"));
        assert!(text.contains("25 CFR Part 11"));
    }

    #[test]
    fn test_court_script_uses_proceeding() {
        let ctx = car_search().with_proceeding(crate::types::ProceedingType::SuppressionHearing);
        let text = KnowledgeBase::prompt_context(&ctx, AnalysisKind::CourtScript, 5000);
        assert!(text.contains("Suppression Hearing guidance"));
    }
}
