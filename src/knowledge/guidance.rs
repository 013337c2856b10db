//! Proceeding guidance, evidence challenges and outcome factors

use crate::types::{IssueCategory, ProceedingType};

/// What to expect at a hearing and how to approach it
#[derive(Debug)]
pub struct ProceedingGuidance {
    pub proceeding: ProceedingType,
    pub summary: &'static str,
    pub considerations: &'static [&'static str],
}

pub fn proceeding_guidance(proceeding: ProceedingType) -> &'static ProceedingGuidance {
    match proceeding {
        ProceedingType::Arraignment => &ARRAIGNMENT,
        ProceedingType::BailHearing => &BAIL_HEARING,
        ProceedingType::PreliminaryHearing => &PRELIMINARY_HEARING,
        ProceedingType::MotionHearing => &MOTION_HEARING,
        ProceedingType::SuppressionHearing => &SUPPRESSION_HEARING,
        ProceedingType::Trial => &TRIAL,
        ProceedingType::Sentencing => &SENTENCING,
    }
}

static ARRAIGNMENT: ProceedingGuidance = ProceedingGuidance {
    proceeding: ProceedingType::Arraignment,
    summary: "First formal court appearance where charges are read and a plea is entered",
    considerations: &[
        "This is typically not the time to argue the case but to understand charges and enter a plea",
        "Pleading not guilty preserves all rights and gives time to build a defense",
        "Listen carefully to the charges and ask for clarification if needed",
        "Request discovery at this stage",
        "Assert the right to a speedy trial clearly and on the record",
        "Take note of any deadlines mentioned by the judge",
    ],
};

static BAIL_HEARING: ProceedingGuidance = ProceedingGuidance {
    proceeding: ProceedingType::BailHearing,
    summary: "Determines release pending trial and under what conditions",
    considerations: &[
        "Focus on factors showing no flight risk or danger to the community",
        "Highlight community ties, employment, family responsibilities and lack of criminal history",
        "Suggest alternative conditions to detention such as monitoring or check-ins",
        "Present a clear release plan",
        "If bail is set too high, argue for reduction based on financial circumstances",
    ],
};

static PRELIMINARY_HEARING: ProceedingGuidance = ProceedingGuidance {
    proceeding: ProceedingType::PreliminaryHearing,
    summary: "The prosecution must show probable cause that the crime was committed",
    considerations: &[
        "Challenge probable cause",
        "Look for inconsistencies in witness testimony",
        "Question whether evidence meets each element of the charged crime",
        "Take detailed notes on testimony for later use at trial",
        "Challenge hearsay evidence that does not fall under an exception",
    ],
};

static MOTION_HEARING: ProceedingGuidance = ProceedingGuidance {
    proceeding: ProceedingType::MotionHearing,
    summary: "Specific requests are argued before the judge",
    considerations: &[
        "Be prepared on the legal basis for the motion",
        "Have relevant case law ready to cite, with copies for the judge",
        "Focus arguments on constitutional violations, not factual innocence",
        "Anticipate counter-arguments and be ready to respond",
        "For dismissal, focus on speedy trial violations or failure to state a claim",
    ],
};

static SUPPRESSION_HEARING: ProceedingGuidance = ProceedingGuidance {
    proceeding: ProceedingType::SuppressionHearing,
    summary: "Decides whether evidence is excluded due to constitutional violations",
    considerations: &[
        "Challenge the initial basis for the stop, search or seizure",
        "Question whether any warrant was properly obtained and executed",
        "Show how the evidence stems from the initial violation",
        "Know the warrant exceptions and why they do not apply",
        "Use timeline inconsistencies to challenge officer credibility",
    ],
};

static TRIAL: ProceedingGuidance = ProceedingGuidance {
    proceeding: ProceedingType::Trial,
    summary: "Facts are presented to a judge or jury to determine guilt or liability",
    considerations: &[
        "Keep the opening statement simple and clear",
        "Keep witness questions concise and purposeful",
        "Object to improper evidence promptly with specific grounds",
        "Preserve issues for appeal with clear objections",
        "Focus on the elements the prosecution must prove",
        "Consider requesting specific jury instructions",
    ],
};

static SENTENCING: ProceedingGuidance = ProceedingGuidance {
    proceeding: ProceedingType::Sentencing,
    summary: "The judge determines punishment after a plea or verdict",
    considerations: &[
        "Focus on mitigating factors such as personal circumstances and rehabilitation",
        "Prepare a sentencing proposal with alternatives to incarceration",
        "Bring supporting character witnesses or letters",
        "Highlight positive steps taken since charges",
        "Address the statutory sentencing factors",
    ],
};

// =============================================================================
// Evidence
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct EvidenceChallenge {
    pub ground: &'static str,
    pub strategy: &'static str,
    /// Lower-case substrings in an evidence description that suggest this ground
    pub cues: &'static [&'static str],
    pub precedents: &'static [&'static str],
}

pub static EVIDENCE_CHALLENGES: [EvidenceChallenge; 4] = [
    EvidenceChallenge {
        ground: "Fourth Amendment violation",
        strategy: "Motion to suppress based on illegal search/seizure",
        cues: &["search", "seiz", "found", "car", "vehicle", "home", "phone"],
        precedents: &["Mapp v. Ohio", "Terry v. Ohio"],
    },
    EvidenceChallenge {
        ground: "Fruit of poisonous tree",
        strategy: "Evidence derived from illegal actions",
        cues: &["after", "led to", "derived", "discovered", "later"],
        precedents: &["Wong Sun v. United States"],
    },
    EvidenceChallenge {
        ground: "Miranda violation",
        strategy: "Statements obtained without proper warnings",
        cues: &["statement", "confess", "interview", "interrogat", "admitted"],
        precedents: &["Miranda v. Arizona", "Missouri v. Seibert"],
    },
    EvidenceChallenge {
        ground: "Chain of custody",
        strategy: "Challenge documentation and handling of evidence",
        cues: &["lab", "sample", "test", "drug", "report", "photo", "video"],
        precedents: &["Brady v. Maryland"],
    },
];

/// Best-matching challenge for one evidence description; chain of custody
/// applies when nothing else does.
pub fn challenge_for(evidence_lower: &str) -> &'static EvidenceChallenge {
    let hits = |c: &EvidenceChallenge| {
        c.cues
            .iter()
            .filter(|cue| evidence_lower.contains(**cue))
            .count()
    };
    // max_by_key keeps the last maximum, so reverse to let ties go to the earliest
    EVIDENCE_CHALLENGES
        .iter()
        .rev()
        .max_by_key(|c| hits(c))
        .filter(|c| hits(c) > 0)
        .unwrap_or(&EVIDENCE_CHALLENGES[3])
}

// =============================================================================
// Outcome Factors
// =============================================================================

#[derive(Debug)]
pub struct SuccessFactors {
    pub key_factors: &'static [&'static str],
    pub improvement_suggestions: &'static [&'static str],
}

/// Neutral starting estimate before any case-specific adjustment
pub const BASE_PROBABILITY: f64 = 0.5;

pub fn success_factors(issue: IssueCategory) -> &'static SuccessFactors {
    match issue {
        IssueCategory::Criminal => &CRIMINAL_FACTORS,
        IssueCategory::Civil | IssueCategory::PersonalInjury | IssueCategory::Housing => {
            &CIVIL_FACTORS
        }
        IssueCategory::Family => &FAMILY_FACTORS,
        IssueCategory::Contract => &CONTRACT_FACTORS,
        IssueCategory::Bankruptcy | IssueCategory::Immigration | IssueCategory::Other => {
            &GENERAL_FACTORS
        }
    }
}

static CRIMINAL_FACTORS: SuccessFactors = SuccessFactors {
    key_factors: &[
        "Statistical analysis of similar criminal cases in this jurisdiction",
        "Procedural adherence by law enforcement",
        "Quality and admissibility of evidence",
        "Potential constitutional rights violations",
    ],
    improvement_suggestions: &[
        "Document any procedural violations by law enforcement",
        "File motions challenging evidence admissibility",
        "Develop timeline to support speedy trial claims",
        "Consider expert witness for technical evidence challenges",
    ],
};

static CIVIL_FACTORS: SuccessFactors = SuccessFactors {
    key_factors: &[
        "Burden of proof requirements for civil claims",
        "Documentary evidence strength",
        "Witness credibility assessment",
        "Relevant precedent in similar civil matters",
    ],
    improvement_suggestions: &[
        "Strengthen documentation of damages",
        "Gather additional witness testimony",
        "Research similar cases with favorable outcomes",
        "Consider settlement negotiations as fallback",
    ],
};

static FAMILY_FACTORS: SuccessFactors = SuccessFactors {
    key_factors: &[
        "Court's tendency to favor specific outcomes in family cases",
        "Documentation of relevant family history",
        "Expert testimony availability",
        "Family court precedent in the jurisdiction",
    ],
    improvement_suggestions: &[
        "Strengthen documentation of family circumstances",
        "Consider child welfare expert testimony",
        "Document history of care and responsibility",
        "Prepare clear parenting or support plan",
    ],
};

static CONTRACT_FACTORS: SuccessFactors = SuccessFactors {
    key_factors: &[
        "Contract language clarity and interpretation",
        "Evidence of performance or breach",
        "Documentation of damages",
        "Relevant business relationship history",
    ],
    improvement_suggestions: &[
        "Strengthen documentation of contract performance",
        "Calculate damages with greater precision",
        "Gather communication records showing intent",
        "Consider alternative dispute resolution",
    ],
};

static GENERAL_FACTORS: SuccessFactors = SuccessFactors {
    key_factors: &[
        "Case complexity and specific legal issues",
        "Documentation quality and completeness",
        "Jurisdiction tendencies for similar cases",
        "Potential procedural or substantive challenges",
    ],
    improvement_suggestions: &[
        "Provide more detailed case information",
        "Upload relevant evidence documentation",
        "Research similar cases in your jurisdiction",
        "Consider consultation with specialized counsel",
    ],
};

// =============================================================================
// Litigation Tactics
// =============================================================================

/// General-purpose strategy used when nothing more specific is known
pub struct StrategyTemplate {
    pub primary_approach: &'static str,
    pub attack_defense_tactics: &'static [&'static str],
    pub procedural_motions: &'static [&'static str],
    pub evidence_challenges: &'static str,
    pub hearing_objections: &'static str,
    pub timing_strategy: &'static str,
}

pub static GENERAL_STRATEGY: StrategyTemplate = StrategyTemplate {
    primary_approach: "Multi-faceted approach focusing on procedural and substantive weaknesses",
    attack_defense_tactics: &[
        "Challenge jurisdiction and venue if applicable",
        "Scrutinize all procedural steps for technical violations",
        "Request all discoverable documents with detailed specificity",
        "Identify inconsistencies in opposition's documentation",
        "Prepare detailed timeline to identify procedural irregularities",
    ],
    procedural_motions: &[
        "Motion to Dismiss for failure to state a claim",
        "Motion for Discovery",
        "Motion to Suppress evidence (if applicable)",
        "Motion for Summary Judgment",
        "Motion for Continuance (if strategically advantageous)",
    ],
    evidence_challenges: "Scrutinize chain of custody for all evidence and identify potential authentication issues",
    hearing_objections: "Prepare specific objections based on hearsay, relevance, and authentication issues",
    timing_strategy: "Strategic use of continuances when advantageous while asserting speedy trial rights when beneficial",
};

pub static RIGHTS_STRATEGY: StrategyTemplate = StrategyTemplate {
    primary_approach: "Comprehensive legal strategy targeting procedural and evidentiary weaknesses",
    attack_defense_tactics: &[
        "Challenge all procedural errors in case processing",
        "Develop constitutional challenges to key evidence",
        "Create parallel defense strategies for multiple paths to victory",
        "Focus on rights violations identified in this analysis",
    ],
    procedural_motions: &[
        "File targeted motions focused on constitutional violations",
        "Submit discovery requests for all evidence",
        "Consider change of venue if local factors may prejudice case",
    ],
    evidence_challenges: "Challenge any evidence with potential chain of custody issues or constitutional problems",
    hearing_objections: "Make timely objections to any inadmissible evidence or testimony",
    timing_strategy: "File motions at strategic times for maximum impact on case progression",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_proceeding_has_guidance() {
        for p in [
            ProceedingType::Arraignment,
            ProceedingType::BailHearing,
            ProceedingType::PreliminaryHearing,
            ProceedingType::MotionHearing,
            ProceedingType::SuppressionHearing,
            ProceedingType::Trial,
            ProceedingType::Sentencing,
        ] {
            let g = proceeding_guidance(p);
            assert_eq!(g.proceeding, p);
            assert!(!g.considerations.is_empty());
        }
    }

    #[test]
    fn test_challenge_selection() {
        assert_eq!(
            challenge_for("bag found during search of car").ground,
            "Fourth Amendment violation"
        );
        assert_eq!(
            challenge_for("my statement during the interview").ground,
            "Miranda violation"
        );
        assert_eq!(challenge_for("receipt").ground, "Chain of custody");
    }

    #[test]
    fn test_success_factors_cover_every_category() {
        for issue in IssueCategory::ALL {
            let f = success_factors(issue);
            assert_eq!(f.key_factors.len(), 4);
            assert_eq!(f.improvement_suggestions.len(), 4);
        }
    }
}
