//! Document strategies by case type
//!
//! Each issue category maps to an ordered list of stages; each stage lists
//! the filings recommended at that point, most important first.

use crate::types::{ForumCategory, IssueCategory};

/// One recommended filing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentStrategy {
    pub document_type: &'static str,
    pub purpose: &'static str,
    pub strategic_guidance: &'static str,
    pub key_elements: &'static [&'static str],
    pub timing: &'static str,
    pub importance: &'static str,
    pub impact: &'static str,
}

#[derive(Debug)]
pub struct StrategyStage {
    pub name: &'static str,
    pub documents: &'static [DocumentStrategy],
}

/// Named stage list for one kind of case
#[derive(Debug)]
pub struct StrategyPlan {
    pub name: &'static str,
    pub stages: &'static [StrategyStage],
}

impl StrategyPlan {
    pub fn documents(&self) -> impl Iterator<Item = &'static DocumentStrategy> + '_ {
        self.stages.iter().flat_map(|s| s.documents.iter())
    }

    /// Up to `per_stage` documents from each stage, in stage order
    pub fn leading_documents(
        &self,
        per_stage: usize,
    ) -> impl Iterator<Item = &'static DocumentStrategy> + '_ {
        self.stages
            .iter()
            .flat_map(move |s| s.documents.iter().take(per_stage))
    }
}

macro_rules! doc {
    ($doc:literal, $purpose:literal, $guidance:literal, [$($el:literal),* $(,)?], $timing:literal, $importance:literal, $impact:literal) => {
        DocumentStrategy {
            document_type: $doc,
            purpose: $purpose,
            strategic_guidance: $guidance,
            key_elements: &[$($el),*],
            timing: $timing,
            importance: $importance,
            impact: $impact,
        }
    };
}

// =============================================================================
// Plans
// =============================================================================

static CRIMINAL_DEFENSE: StrategyPlan = StrategyPlan {
    name: "criminal_defense",
    stages: &[
        StrategyStage {
            name: "initial_stage",
            documents: &[
                doc!(
                    "Discovery Request",
                    "Obtain all evidence in possession of prosecutor",
                    "Request every category of evidence, including police reports, recordings and lab results",
                    ["Specific categories of evidence", "Legal basis for discovery", "Deadline for production"],
                    "Immediately after arraignment",
                    "High",
                    "Provides information essential to your defense"
                ),
                doc!(
                    "Brady Motion",
                    "Specifically request exculpatory evidence",
                    "Name the kinds of favorable evidence you believe exist",
                    ["Description of favorable evidence sought", "Brady v. Maryland obligations"],
                    "With initial discovery request",
                    "High",
                    "Forces disclosure of evidence that may undermine the charges"
                ),
                doc!(
                    "Motion to Preserve Evidence",
                    "Ensure all evidence is preserved intact",
                    "List recordings and physical items at risk of routine destruction",
                    ["Items to preserve", "Risk of loss", "Requested order"],
                    "As soon as possible after charges filed",
                    "Medium",
                    "Prevents loss of evidence needed for later challenges"
                ),
            ],
        },
        StrategyStage {
            name: "pre_trial",
            documents: &[
                doc!(
                    "Motion to Suppress",
                    "Exclude illegally obtained evidence",
                    "Focus on Fourth Amendment violations in evidence collection",
                    ["Specific evidence to suppress", "Legal basis for suppression", "How rights were violated"],
                    "After discovery reveals basis",
                    "High",
                    "Can significantly weaken prosecution's case if successful"
                ),
                doc!(
                    "Motion to Dismiss",
                    "Challenge legal sufficiency of charges",
                    "Identify missing elements or procedural defects in the charging document",
                    ["Charged offense elements", "Factual or legal deficiency", "Relief requested"],
                    "After discovery reveals weaknesses",
                    "High",
                    "Ends the prosecution if granted"
                ),
                doc!(
                    "Motion for Bill of Particulars",
                    "Force prosecution to specify charges in detail",
                    "Point to the vague portions of the charging document",
                    ["Vague allegations", "Details requested"],
                    "If charging document is vague",
                    "Medium",
                    "Narrows what the prosecution may try to prove"
                ),
            ],
        },
        StrategyStage {
            name: "trial",
            documents: &[
                doc!(
                    "Motion in Limine",
                    "Exclude prejudicial evidence before trial",
                    "Target evidence whose prejudice outweighs its value",
                    ["Evidence to exclude", "Rule of evidence relied on"],
                    "Before trial begins",
                    "High",
                    "Keeps damaging material away from the jury"
                ),
                doc!(
                    "Jury Instructions",
                    "Shape how law is presented to jury",
                    "Propose instructions on every element and defense",
                    ["Proposed instruction text", "Supporting authority"],
                    "Before jury deliberation",
                    "Medium",
                    "Frames how jurors apply the law"
                ),
                doc!(
                    "Directed Verdict Motion",
                    "Judgment as matter of law",
                    "Argue the prosecution failed to prove each element",
                    ["Elements not proven", "Record citations"],
                    "After prosecution's case",
                    "Medium",
                    "Ends the case without jury deliberation if granted"
                ),
            ],
        },
    ],
};

static CIVIL_RIGHTS: StrategyPlan = StrategyPlan {
    name: "civil_rights",
    stages: &[
        StrategyStage {
            name: "initial_stage",
            documents: &[
                doc!(
                    "Section 1983 Complaint",
                    "Claim for civil rights violations",
                    "Clearly articulate legal claims and supporting facts",
                    ["Statement of facts", "Legal claims", "Prayer for relief"],
                    "Within statute of limitations",
                    "Critical",
                    "Establishes foundation of entire case"
                ),
                doc!(
                    "Temporary Restraining Order",
                    "Immediate injunctive relief",
                    "Show irreparable harm if relief is delayed",
                    ["Threatened harm", "Likelihood of success", "Requested order"],
                    "When immediate harm threatens",
                    "High",
                    "Stops ongoing harm while the case proceeds"
                ),
                doc!(
                    "Preliminary Injunction Motion",
                    "Relief during pendency of case",
                    "Build the record on each injunction factor",
                    ["Likelihood of success", "Irreparable harm", "Balance of hardships"],
                    "Early in proceedings",
                    "Medium",
                    "Preserves the status quo until judgment"
                ),
            ],
        },
        StrategyStage {
            name: "discovery",
            documents: &[
                doc!(
                    "Document Requests",
                    "Obtain policy manuals, training materials, personnel files",
                    "Request specific documents relevant to claims",
                    ["Categories of documents", "Relevant time period"],
                    "After initial disclosures",
                    "High",
                    "Builds evidence for your position"
                ),
                doc!(
                    "Interrogatories",
                    "Written questions about practices and procedures",
                    "Ask targeted questions that pin down practices",
                    ["Numbered questions", "Definitions"],
                    "With document requests",
                    "Medium",
                    "Locks the opposing party into sworn answers"
                ),
                doc!(
                    "Depositions",
                    "Question officials under oath",
                    "Prepare questions from the documents produced",
                    ["Witness list", "Topics", "Exhibits"],
                    "After document review",
                    "Medium",
                    "Produces testimony usable at trial"
                ),
            ],
        },
        StrategyStage {
            name: "dispositive",
            documents: &[
                doc!(
                    "Opposition to Qualified Immunity",
                    "Overcome immunity defense",
                    "Show the right was clearly established at the time",
                    ["Clearly established law", "Disputed facts"],
                    "In response to defense motion",
                    "High",
                    "Keeps individual defendants in the case"
                ),
                doc!(
                    "Summary Judgment Motion",
                    "Judgment without trial",
                    "Show there is no genuine dispute of material fact",
                    ["Undisputed facts", "Legal argument"],
                    "After discovery complete",
                    "Medium",
                    "Resolves the case without trial"
                ),
            ],
        },
    ],
};

static PERSONAL_INJURY: StrategyPlan = StrategyPlan {
    name: "personal_injury",
    stages: &[StrategyStage {
        name: "initial_stage",
        documents: &[
            doc!(
                "Complaint/Petition",
                "Initiates your civil lawsuit and outlines claims",
                "Clearly articulate legal claims and supporting facts",
                ["Statement of facts", "Legal claims", "Prayer for relief"],
                "Initial filing to start case",
                "Critical",
                "Establishes foundation of entire case"
            ),
            doc!(
                "Discovery Requests",
                "Obtain information and evidence from opposing party",
                "Request specific documents and information relevant to claims",
                ["Interrogatories", "Requests for production", "Requests for admission"],
                "After initial pleadings",
                "High",
                "Builds evidence for your position"
            ),
        ],
    }],
};

static CONTRACT_DISPUTE: StrategyPlan = StrategyPlan {
    name: "contract_dispute",
    stages: &[StrategyStage {
        name: "initial_stage",
        documents: &[
            doc!(
                "Breach of Contract Complaint",
                "Initiates legal action for contract breach",
                "Clearly establish contract terms and alleged breach",
                ["Contract terms", "Breach details", "Damages claimed"],
                "Initial filing",
                "Critical",
                "Establishes basis for entire case"
            ),
            doc!(
                "Motion for Specific Performance",
                "Seeks court order requiring contract performance",
                "Demonstrate why monetary damages are inadequate",
                ["Contract terms", "Performance obligations", "Inadequacy of damages"],
                "After establishing contract validity",
                "High",
                "Can obtain actual performance instead of damages"
            ),
        ],
    }],
};

static TRIBAL_CONTRACT: StrategyPlan = StrategyPlan {
    name: "tribal_contract",
    stages: &[
        StrategyStage {
            name: "initial_stage",
            documents: &[
                doc!(
                    "Complaint for Breach of Contract",
                    "Formally initiate legal action for contract breach",
                    "Plead the contract's dispute and forum clauses alongside the breach",
                    ["Contract terms", "Breach details", "Forum selection clause"],
                    "Within contractual or statutory limitations",
                    "Critical",
                    "Establishes basis for entire case"
                ),
                TRIBAL_JURISDICTION_MOTION,
                doc!(
                    "Notice of Contractual Dispute Resolution",
                    "Invoke any dispute resolution procedures in contract",
                    "Follow the contract's notice requirements exactly",
                    ["Dispute resolution clause", "Notice recipients"],
                    "Before or concurrent with filing",
                    "Medium",
                    "Preserves contractual remedies"
                ),
            ],
        },
        StrategyStage {
            name: "sovereign_immunity",
            documents: &[
                doc!(
                    "Motion to Address Sovereign Immunity",
                    "Establish whether sovereign immunity has been waived",
                    "Check for contractual waiver of sovereign immunity",
                    ["Waiver language", "Authority of signatory"],
                    "Early procedural stage",
                    "High",
                    "Determines whether the claim can proceed at all"
                ),
                doc!(
                    "Request for Waiver Determination",
                    "Ask court to determine if immunity was contractually waived",
                    "Quote the waiver clause and the tribal resolution approving it",
                    ["Waiver clause", "Approving resolution"],
                    "Before substantive proceedings",
                    "Medium",
                    "Settles immunity before merits litigation"
                ),
            ],
        },
        StrategyStage {
            name: "resolution",
            documents: &[
                doc!(
                    "Motion for Summary Judgment",
                    "Resolve clear contract issues without trial",
                    "Rely on the contract text and payment records",
                    ["Undisputed terms", "Evidence of breach"],
                    "After discovery completion",
                    "Medium",
                    "Resolves the case without trial"
                ),
                doc!(
                    "Settlement Proposal",
                    "Formal written settlement terms",
                    "Anchor the proposal to documented damages",
                    ["Proposed terms", "Payment schedule"],
                    "Any point after filing",
                    "Medium",
                    "May end the dispute on acceptable terms"
                ),
            ],
        },
    ],
};

static FAMILY_LAW: StrategyPlan = StrategyPlan {
    name: "family_law",
    stages: &[StrategyStage {
        name: "initial_stage",
        documents: &[
            doc!(
                "Petition for Dissolution/Custody",
                "Initiates family court proceedings",
                "Clearly state requested relief and supporting facts",
                ["Party information", "Requested relief", "Statutory grounds"],
                "Initial filing",
                "Critical",
                "Establishes case parameters"
            ),
            doc!(
                "Parenting Plan",
                "Establishes custody and visitation arrangements",
                "Focus on best interests of the child factors",
                ["Custody schedule", "Decision-making provisions", "Child's needs"],
                "With initial filing or before final hearing",
                "High",
                "Determines future parent-child arrangements"
            ),
        ],
    }],
};

static BANKRUPTCY: StrategyPlan = StrategyPlan {
    name: "bankruptcy",
    stages: &[StrategyStage {
        name: "initial_stage",
        documents: &[
            doc!(
                "Bankruptcy Petition",
                "Initiates bankruptcy proceedings",
                "Complete all schedules with accurate information",
                ["Complete asset listing", "All creditors listed", "Financial history"],
                "Initial filing",
                "Critical",
                "Establishes bankruptcy case"
            ),
            doc!(
                "Means Test Calculation",
                "Determines eligibility for Chapter 7 or required Chapter 13 payment",
                "Accurately document all income and allowable expenses",
                ["Income verification", "Expense documentation", "Statutory deductions"],
                "With initial filing",
                "High",
                "Determines bankruptcy chapter and payment requirements"
            ),
        ],
    }],
};

static HABEAS_CORPUS: StrategyPlan = StrategyPlan {
    name: "habeas_corpus",
    stages: &[
        StrategyStage {
            name: "initial_stage",
            documents: &[
                doc!(
                    "Habeas Petition",
                    "Challenge legality of detention",
                    "State each ground for relief separately",
                    ["Custody facts", "Grounds for relief", "Exhaustion of remedies"],
                    "After exhausting available remedies",
                    "Critical",
                    "Can secure release from unlawful detention"
                ),
                doc!(
                    "Motion to Appoint Counsel",
                    "Obtain legal representation",
                    "Explain the complexity of the claims and inability to pay",
                    ["Financial affidavit", "Complexity of issues"],
                    "With initial petition",
                    "High",
                    "Provides professional representation"
                ),
                doc!(
                    "Discovery Motion",
                    "Obtain evidence supporting claims",
                    "Show good cause for each request",
                    ["Specific requests", "Good cause"],
                    "After petition accepted",
                    "Medium",
                    "Develops the factual record"
                ),
            ],
        },
        StrategyStage {
            name: "relief",
            documents: &[
                doc!(
                    "Form I-589 (Asylum Application)",
                    "Requests asylum protection in the United States",
                    "Clearly document persecution or fear of persecution",
                    ["Personal background", "Basis for asylum claim", "Supporting evidence"],
                    "Within one year of arrival or with changed circumstances",
                    "Critical",
                    "Basis for asylum protection"
                ),
                doc!(
                    "Motion to Reopen/Reconsider",
                    "Challenges negative immigration decision",
                    "Identify specific errors or new evidence",
                    ["Legal basis for motion", "New evidence or legal arguments", "Relief requested"],
                    "Within filing deadlines (typically 30-90 days)",
                    "High",
                    "Could reverse negative decision"
                ),
            ],
        },
        StrategyStage {
            name: "development",
            documents: &[
                doc!(
                    "Motion for Evidentiary Hearing",
                    "Present new evidence",
                    "Identify facts the existing record cannot resolve",
                    ["Disputed facts", "Proposed witnesses"],
                    "After response to petition",
                    "Medium",
                    "Allows live testimony on disputed facts"
                ),
                doc!(
                    "Motion to Expand Record",
                    "Include additional evidence",
                    "Attach the new material and explain its relevance",
                    ["New evidence", "Relevance"],
                    "When new evidence discovered",
                    "Low",
                    "Adds support for the claims"
                ),
            ],
        },
    ],
};

static GENERAL: StrategyPlan = StrategyPlan {
    name: "general",
    stages: &[StrategyStage {
        name: "initial_stage",
        documents: &[
            doc!(
                "Initial Filing",
                "Starts your legal case and outlines claims or defenses",
                "Clearly articulate your position and legal basis",
                ["Statement of facts", "Legal claims or defenses", "Relief requested"],
                "At the beginning of your case",
                "Critical",
                "Establishes foundation of your case"
            ),
            doc!(
                "Discovery Requests",
                "Obtain relevant information and evidence",
                "Request specific information relevant to your case",
                ["Clear requests", "Legal basis for requests", "Connection to case issues"],
                "Early in the case process",
                "High",
                "Provides evidence to support your position"
            ),
        ],
    }],
};

/// Filing that establishes tribal, CFR or federal court authority
pub const TRIBAL_JURISDICTION_MOTION: DocumentStrategy = doc!(
    "Motion to Determine Jurisdiction",
    "Establish whether tribal, CFR, or federal court has jurisdiction",
    "Determine if case falls under CFR court jurisdiction (25 CFR Part 11) and whether federal law preempts tribal authority",
    ["Parties' tribal affiliation", "Location of the dispute", "Contractual forum clauses"],
    "At filing or immediately after",
    "High",
    "Fixes which court may hear the case"
);

/// Special considerations for cases heard in a tribal forum
pub const TRIBAL_CONSIDERATIONS: &[&str] = &[
    "Check for contractual waiver of sovereign immunity",
    "Determine if case falls under CFR court jurisdiction (25 CFR Part 11)",
    "Identify if federal law preempts tribal authority",
    "Consider alternative dispute resolution mechanisms specified in contract",
];

/// Stage plan for a case
pub fn strategy_plan(issue: IssueCategory, forum: ForumCategory) -> &'static StrategyPlan {
    match (issue, forum) {
        (IssueCategory::Contract, ForumCategory::Tribal) => &TRIBAL_CONTRACT,
        (IssueCategory::Criminal, _) => &CRIMINAL_DEFENSE,
        (IssueCategory::Civil | IssueCategory::Housing, _) => &CIVIL_RIGHTS,
        (IssueCategory::PersonalInjury, _) => &PERSONAL_INJURY,
        (IssueCategory::Contract, _) => &CONTRACT_DISPUTE,
        (IssueCategory::Family, _) => &FAMILY_LAW,
        (IssueCategory::Bankruptcy, _) => &BANKRUPTCY,
        (IssueCategory::Immigration, _) => &HABEAS_CORPUS,
        (IssueCategory::Other, _) => &GENERAL,
    }
}
