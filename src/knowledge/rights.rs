//! Rights profiles, keyword tables and precedents
//!
//! Every [`RightCategory`] resolves to one static [`RightProfile`]; the
//! issue-category tables below decide which rights are candidates for a case
//! and which are assumed when no keyword matches.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::IssueCategory;

/// A right or claim area the rule base knows about
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RightCategory {
    // Constitutional (criminal)
    FourthAmendment,
    FifthAmendment,
    SixthAmendment,
    EighthAmendment,

    // Civil
    DueProcess,
    Property,
    ContractRights,
    TortClaims,

    // Family
    ParentalRights,
    PropertyDivision,
    SupportRights,

    // Contract
    ContractFormation,
    ContractPerformance,
    ContractDamages,
    ContractInterpretation,

    // Immigration
    ImmigrationDueProcess,
    Asylum,
    ImmigrationStatus,

    // Bankruptcy
    AutomaticStay,
    Discharge,
    Exemptions,

    // General
    ProceduralRights,
    SubstantiveRights,
}

/// A precedent citation attached to a right
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precedent {
    pub case_name: &'static str,
    pub citation: &'static str,
    pub year: u16,
    pub court: &'static str,
    pub holding: &'static str,
    pub application: &'static str,
}

/// Static description of one right category
#[derive(Debug)]
pub struct RightProfile {
    pub category: RightCategory,
    pub name: &'static str,
    pub description: &'static str,
    pub key_principle: &'static str,
    pub common_violations: &'static [&'static str],
    pub key_questions: &'static [&'static str],
    /// Lower-case substrings that suggest this right is at issue
    pub keywords: &'static [&'static str],
    pub precedents: &'static [Precedent],
}

const SCOTUS: &str = "U.S. Supreme Court";

macro_rules! precedent {
    ($name:literal, $cite:literal, $year:literal, $court:expr, $holding:literal, $application:literal) => {
        Precedent {
            case_name: $name,
            citation: $cite,
            year: $year,
            court: $court,
            holding: $holding,
            application: $application,
        }
    };
}

/// Stop-and-frisk precedent cited when no right-specific precedent exists
pub const TERRY_V_OHIO: Precedent = precedent!(
    "Terry v. Ohio",
    "392 U.S. 1",
    1968,
    SCOTUS,
    "Police may briefly detain a person only on reasonable suspicion supported by specific and articulable facts",
    "Challenge whether officers had specific, articulable facts to justify the stop"
);

// =============================================================================
// Profiles
// =============================================================================

static FOURTH_AMENDMENT: RightProfile = RightProfile {
    category: RightCategory::FourthAmendment,
    name: "Fourth Amendment Rights",
    description: "Protection against unreasonable searches and seizures",
    key_principle: "Searches and seizures require a warrant supported by probable cause unless a recognized exception applies",
    common_violations: &[
        "Warrantless search without exception",
        "Overbroad search exceeding scope",
        "Search based on insufficient probable cause",
        "Illegal stop without reasonable suspicion",
        "Excessive force during arrest/seizure",
    ],
    key_questions: &[
        "Was there a legitimate expectation of privacy?",
        "Was there a warrant based on probable cause?",
        "If no warrant, was there a recognized exception?",
        "Was the scope of the search/seizure reasonable?",
        "Was evidence handled properly after seizure?",
    ],
    keywords: &["search", "seizure", "warrant", "privacy", "stop", "arrest", "detain", "property"],
    precedents: &[
        precedent!(
            "United States v. Jones",
            "565 U.S. 400",
            2012,
            SCOTUS,
            "Installation of GPS tracking device on vehicle constitutes a search under Fourth Amendment",
            "Use when challenging GPS tracking or electronic surveillance without a warrant"
        ),
        precedent!(
            "Rodriguez v. United States",
            "575 U.S. 348",
            2015,
            SCOTUS,
            "Police cannot extend traffic stop beyond time needed to address the traffic violation without reasonable suspicion",
            "Use when challenging evidence from prolonged traffic stops"
        ),
        TERRY_V_OHIO,
        precedent!(
            "Mapp v. Ohio",
            "367 U.S. 643",
            1961,
            SCOTUS,
            "Evidence obtained in violation of the Fourth Amendment is inadmissible in state prosecutions",
            "Basis for excluding evidence from an unlawful search"
        ),
        precedent!(
            "Wong Sun v. United States",
            "371 U.S. 471",
            1963,
            SCOTUS,
            "Evidence derived from an unlawful search or arrest is excluded as fruit of the poisonous tree",
            "Extend suppression to evidence discovered through an initial violation"
        ),
    ],
};

static FIFTH_AMENDMENT: RightProfile = RightProfile {
    category: RightCategory::FifthAmendment,
    name: "Fifth Amendment Rights",
    description: "Protection against self-incrimination and double jeopardy",
    key_principle: "No person may be compelled to be a witness against themselves",
    common_violations: &[
        "Failure to provide Miranda warnings in custody",
        "Continued questioning after right to counsel invoked",
        "Coerced confession",
        "Property taken without due process",
        "Prosecution after jeopardy attached",
    ],
    key_questions: &[
        "Was the person in custody during questioning?",
        "Were Miranda warnings properly given?",
        "Was the right to remain silent honored?",
        "Is there a double jeopardy issue?",
        "Was due process followed?",
    ],
    keywords: &[
        "silent",
        "miranda",
        "confession",
        "custody",
        "interrogation",
        "statement",
        "self-incrimination",
    ],
    precedents: &[
        precedent!(
            "Berghuis v. Thompkins",
            "560 U.S. 370",
            2010,
            SCOTUS,
            "Suspect must unambiguously invoke right to remain silent; silence alone is insufficient",
            "Consider when evaluating whether right to silence was properly invoked"
        ),
        precedent!(
            "Missouri v. Seibert",
            "542 U.S. 600",
            2004,
            SCOTUS,
            "Two-step interrogation technique (questioning without Miranda, then with Miranda) is unconstitutional",
            "Use when challenging confessions obtained after deliberate withholding of Miranda warnings"
        ),
        precedent!(
            "Miranda v. Arizona",
            "384 U.S. 436",
            1966,
            SCOTUS,
            "Statements from custodial interrogation are inadmissible unless the suspect was warned of their rights",
            "Suppress statements taken in custody without warnings"
        ),
    ],
};

static SIXTH_AMENDMENT: RightProfile = RightProfile {
    category: RightCategory::SixthAmendment,
    name: "Sixth Amendment Rights",
    description: "Right to counsel, speedy trial, and confrontation",
    key_principle: "The accused is entitled to counsel, a speedy and public trial, and to confront adverse witnesses",
    common_violations: &[
        "Denial of counsel during critical proceedings",
        "Excessive pre-trial delay without justification",
        "Use of testimonial hearsay without confrontation",
        "Closed proceedings without proper justification",
        "Biased jury selection process",
    ],
    key_questions: &[
        "Was counsel provided at critical stages?",
        "Was there an unreasonable delay in prosecution?",
        "Has the right to confront witnesses been preserved?",
        "Was the trial public?",
        "Was the jury impartial?",
    ],
    keywords: &[
        "attorney", "lawyer", "counsel", "speedy", "trial", "witness", "confront", "jury",
    ],
    precedents: &[
        precedent!(
            "Missouri v. Frye",
            "566 U.S. 134",
            2012,
            SCOTUS,
            "Defense counsel has duty to communicate formal plea offers to accused",
            "Use in ineffective assistance claims where plea offers weren't communicated"
        ),
        precedent!(
            "Barker v. Wingo",
            "407 U.S. 514",
            1972,
            SCOTUS,
            "Four-part speedy trial test: length of delay, reason for delay, assertion of the right, and prejudice",
            "Framework for analyzing speedy trial claims"
        ),
        precedent!(
            "Gideon v. Wainwright",
            "372 U.S. 335",
            1963,
            SCOTUS,
            "States must provide counsel to defendants who cannot afford an attorney",
            "Assert the right to appointed counsel at every critical stage"
        ),
    ],
};

static EIGHTH_AMENDMENT: RightProfile = RightProfile {
    category: RightCategory::EighthAmendment,
    name: "Eighth Amendment Rights",
    description: "Protection against excessive bail, fines, and cruel punishment",
    key_principle: "Bail, fines and punishment must not be excessive or cruel and unusual",
    common_violations: &[
        "Excessive bail without individualized assessment",
        "Inhumane detention conditions",
        "Disproportionate sentencing",
        "Deliberate indifference to medical needs",
    ],
    key_questions: &[
        "Is the bail amount proportional to the offense?",
        "Are detention conditions humane and constitutional?",
        "Is the punishment proportional to the crime?",
        "Are there medical needs being ignored?",
    ],
    keywords: &["bail", "fine", "cruel", "punishment", "sentence", "excessive"],
    precedents: &[
        precedent!(
            "Stack v. Boyle",
            "342 U.S. 1",
            1951,
            SCOTUS,
            "Bail set higher than an amount reasonably calculated to assure appearance is excessive",
            "Argue for bail reduction based on individual circumstances"
        ),
        precedent!(
            "Estelle v. Gamble",
            "429 U.S. 97",
            1976,
            SCOTUS,
            "Deliberate indifference to serious medical needs of prisoners is cruel and unusual punishment",
            "Challenge denial of medical care in detention"
        ),
    ],
};

static DUE_PROCESS: RightProfile = RightProfile {
    category: RightCategory::DueProcess,
    name: "Due Process Rights",
    description: "Right to notice and a meaningful opportunity to be heard",
    key_principle: "Fifth and Fourteenth Amendment due process guarantees",
    common_violations: &[
        "Action taken without adequate notice",
        "Denial of a meaningful hearing before deprivation",
        "Decision by a biased or interested decision-maker",
        "Withholding of favorable evidence",
    ],
    key_questions: &[
        "Was proper notice given?",
        "Was there an opportunity to respond before the decision?",
        "Was the decision-maker neutral?",
    ],
    keywords: &["notice", "hearing", "opportunity", "respond", "fair", "process"],
    precedents: &[
        precedent!(
            "Mathews v. Eldridge",
            "424 U.S. 319",
            1976,
            SCOTUS,
            "Procedural protections are measured by the private interest, the risk of error and the government interest",
            "Frame the process owed before a deprivation"
        ),
        precedent!(
            "Brady v. Maryland",
            "373 U.S. 83",
            1963,
            SCOTUS,
            "Suppression of evidence favorable to the accused violates due process",
            "Compel disclosure of exculpatory evidence"
        ),
    ],
};

static PROPERTY: RightProfile = RightProfile {
    category: RightCategory::Property,
    name: "Property Rights",
    description: "Protection of ownership, possession and use of property",
    key_principle: "Property may not be taken or interfered with without lawful process",
    common_violations: &[
        "Interference with possession without legal process",
        "Unlawful retention of property or deposits",
        "Disregard of recorded title or interest",
    ],
    key_questions: &[
        "Who holds title or a possessory interest?",
        "Was lawful process followed before dispossession?",
    ],
    keywords: &["property", "ownership", "possession", "title", "interest"],
    precedents: &[],
};

static CONTRACT_RIGHTS: RightProfile = RightProfile {
    category: RightCategory::ContractRights,
    name: "Contract Rights",
    description: "Enforcement of agreed terms between parties",
    key_principle: "Parties are bound by the terms they agreed to",
    common_violations: &[
        "Failure to perform agreed obligations",
        "Unilateral change of contract terms",
    ],
    key_questions: &[
        "What terms did the parties agree to?",
        "Which obligations were not performed?",
    ],
    keywords: &["agreement", "contract", "breach", "promise", "term", "condition"],
    precedents: &[],
};

static TORT_CLAIMS: RightProfile = RightProfile {
    category: RightCategory::TortClaims,
    name: "Tort Claims",
    description: "Recovery for injury caused by another's wrongful conduct",
    key_principle: "A party who breaches a duty of care is liable for the harm it causes",
    common_violations: &[
        "Negligent conduct causing injury",
        "Failure to maintain safe conditions",
        "Failure to warn of known hazards",
    ],
    key_questions: &[
        "What duty of care was owed?",
        "How was the duty breached?",
        "What damages resulted?",
    ],
    keywords: &["injury", "damage", "harm", "negligence", "duty", "care"],
    precedents: &[precedent!(
        "Palsgraf v. Long Island Railroad Co.",
        "248 N.Y. 339",
        1928,
        "New York Court of Appeals",
        "Liability for negligence extends to harms within the foreseeable zone of risk",
        "Establish that the injury was a foreseeable consequence of the conduct"
    )],
};

static PARENTAL_RIGHTS: RightProfile = RightProfile {
    category: RightCategory::ParentalRights,
    name: "Parental Rights",
    description: "Right to the care, custody and control of one's children",
    key_principle: "Custody decisions turn on the best interests of the child",
    common_violations: &[
        "Custody modified without proper hearing",
        "Visitation denied without court order",
        "Best-interest factors ignored",
    ],
    key_questions: &[
        "What custody orders are in place?",
        "What arrangement serves the child's best interests?",
    ],
    keywords: &["custody", "visitation", "parent", "child", "decision"],
    precedents: &[precedent!(
        "Troxel v. Granville",
        "530 U.S. 57",
        2000,
        SCOTUS,
        "Parents have a fundamental liberty interest in the care, custody and control of their children",
        "Support a parent's decision-making authority against third-party claims"
    )],
};

static PROPERTY_DIVISION: RightProfile = RightProfile {
    category: RightCategory::PropertyDivision,
    name: "Property Division",
    description: "Fair division of marital assets and debts",
    key_principle: "Marital property is divided equitably; separate property is protected",
    common_violations: &[
        "Hidden or undisclosed marital assets",
        "Separate property treated as marital",
    ],
    key_questions: &[
        "Which assets are marital and which separate?",
        "Have all assets been disclosed?",
    ],
    keywords: &["property", "asset", "division", "marital", "separate", "equitable"],
    precedents: &[],
};

static SUPPORT_RIGHTS: RightProfile = RightProfile {
    category: RightCategory::SupportRights,
    name: "Support Rights",
    description: "Child support and spousal maintenance obligations",
    key_principle: "Support reflects the recipient's need and the payer's ability to pay",
    common_violations: &[
        "Support calculated on inaccurate income",
        "Failure to pay ordered support",
    ],
    key_questions: &[
        "What are each party's income and expenses?",
        "Is the current order being followed?",
    ],
    keywords: &["support", "alimony", "maintenance", "financial", "need", "ability"],
    precedents: &[],
};

static CONTRACT_FORMATION: RightProfile = RightProfile {
    category: RightCategory::ContractFormation,
    name: "Contract Formation",
    description: "Whether an enforceable agreement was formed",
    key_principle: "A contract requires offer, acceptance and consideration",
    common_violations: &[
        "Enforcement of an agreement never validly formed",
        "Denial of an agreement supported by consideration",
    ],
    key_questions: &[
        "Was there a clear offer and acceptance?",
        "What consideration was exchanged?",
    ],
    keywords: &["offer", "acceptance", "consideration", "agreement", "intent", "formed"],
    precedents: &[],
};

static CONTRACT_PERFORMANCE: RightProfile = RightProfile {
    category: RightCategory::ContractPerformance,
    name: "Contract Performance",
    description: "Whether each party performed its obligations",
    key_principle: "Material breach excuses the other party's performance and supports damages",
    common_violations: &[
        "Failure to perform on time",
        "Partial or defective performance",
        "Anticipatory repudiation",
    ],
    key_questions: &[
        "Which obligations were due and when?",
        "Was the breach material?",
    ],
    keywords: &["breach", "perform", "obligation", "fulfill", "term", "condition"],
    precedents: &[],
};

static CONTRACT_DAMAGES: RightProfile = RightProfile {
    category: RightCategory::ContractDamages,
    name: "Contract Damages",
    description: "Remedies available for breach",
    key_principle: "Damages put the injured party where performance would have left them",
    common_violations: &[
        "Refusal to compensate for foreseeable losses",
        "Withholding payment owed under the agreement",
    ],
    key_questions: &[
        "What losses flowed from the breach?",
        "Were the losses foreseeable when contracting?",
    ],
    keywords: &["damage", "loss", "compensation", "remedy", "specific", "performance"],
    precedents: &[precedent!(
        "Hadley v. Baxendale",
        "9 Exch. 341",
        1854,
        "Court of Exchequer",
        "Recoverable damages are those arising naturally from the breach or contemplated by both parties",
        "Tie each claimed loss to what the parties could foresee"
    )],
};

static CONTRACT_INTERPRETATION: RightProfile = RightProfile {
    category: RightCategory::ContractInterpretation,
    name: "Contract Interpretation",
    description: "Meaning of disputed or ambiguous terms",
    key_principle: "Ambiguous terms are construed against the drafter",
    common_violations: &[
        "Reading a term contrary to its plain meaning",
        "Ignoring course of dealing between the parties",
    ],
    key_questions: &[
        "Is the disputed language ambiguous?",
        "What does the parties' course of dealing show?",
    ],
    keywords: &["ambiguity", "meaning", "interpret", "unclear", "term", "language"],
    precedents: &[],
};

static IMMIGRATION_DUE_PROCESS: RightProfile = RightProfile {
    category: RightCategory::ImmigrationDueProcess,
    name: "Due Process Rights",
    description: "Notice and a fair hearing in removal proceedings",
    key_principle: "Noncitizens in removal proceedings are entitled to due process of law",
    common_violations: &[
        "Defective notice to appear",
        "Denial of a full and fair hearing",
        "Prolonged detention without review",
    ],
    key_questions: &[
        "Was the notice to appear complete and timely?",
        "Was there an opportunity to present evidence?",
    ],
    keywords: &["notice", "hearing", "opportunity", "process", "appeal", "review"],
    precedents: &[precedent!(
        "Zadvydas v. Davis",
        "533 U.S. 678",
        2001,
        SCOTUS,
        "Post-removal-period detention is limited to a period reasonably necessary to secure removal",
        "Challenge indefinite immigration detention"
    )],
};

static ASYLUM: RightProfile = RightProfile {
    category: RightCategory::Asylum,
    name: "Asylum Rights",
    description: "Protection for those facing persecution on return",
    key_principle: "A well-founded fear of persecution on a protected ground supports asylum",
    common_violations: &[
        "Credible fear claim not properly heard",
        "Return to a country where persecution is likely",
    ],
    key_questions: &[
        "What persecution was suffered or feared?",
        "Is it tied to a protected ground?",
    ],
    keywords: &["asylum", "refugee", "persecution", "fear", "return", "credible"],
    precedents: &[precedent!(
        "INS v. Cardoza-Fonseca",
        "480 U.S. 421",
        1987,
        SCOTUS,
        "A well-founded fear of persecution requires less than a showing that persecution is more likely than not",
        "Apply the lower asylum standard rather than the withholding standard"
    )],
};

static IMMIGRATION_STATUS: RightProfile = RightProfile {
    category: RightCategory::ImmigrationStatus,
    name: "Immigration Status",
    description: "Maintenance and adjustment of lawful status",
    key_principle: "Status may only be terminated on statutory grounds after proper process",
    common_violations: &[
        "Status terminated without stated grounds",
        "Eligible adjustment application denied",
    ],
    key_questions: &[
        "What status is currently held?",
        "What relief from removal is available?",
    ],
    keywords: &["status", "visa", "green card", "permanent", "residence", "removal"],
    precedents: &[],
};

static AUTOMATIC_STAY: RightProfile = RightProfile {
    category: RightCategory::AutomaticStay,
    name: "Automatic Stay",
    description: "Halt on collection actions once a petition is filed",
    key_principle: "Filing a petition stays most collection activity against the debtor",
    common_violations: &[
        "Collection calls or lawsuits continued after filing",
        "Garnishment or repossession during the stay",
    ],
    key_questions: &[
        "When was the petition filed?",
        "Which creditors acted after filing?",
    ],
    keywords: &["stay", "collection", "creditor", "stop", "action", "pursue"],
    precedents: &[],
};

static DISCHARGE: RightProfile = RightProfile {
    category: RightCategory::Discharge,
    name: "Discharge Rights",
    description: "Release from personal liability for dischargeable debts",
    key_principle: "A discharge permanently bars collection of discharged debts",
    common_violations: &[
        "Collection attempts on discharged debts",
        "Misreporting discharged debts as owed",
    ],
    key_questions: &[
        "Which debts are dischargeable?",
        "Has a creditor objected to discharge?",
    ],
    keywords: &["discharge", "debt", "eliminate", "fresh", "start"],
    precedents: &[],
};

static EXEMPTIONS: RightProfile = RightProfile {
    category: RightCategory::Exemptions,
    name: "Exemption Rights",
    description: "Protection of necessary property from creditors",
    key_principle: "Exempt property remains with the debtor",
    common_violations: &[
        "Exempt assets claimed by the trustee or creditors",
        "Exemptions not applied to eligible property",
    ],
    key_questions: &[
        "Which exemption scheme applies?",
        "Which assets qualify as exempt?",
    ],
    keywords: &["exempt", "exemption", "protect", "asset", "property", "keep"],
    precedents: &[],
};

static PROCEDURAL_RIGHTS: RightProfile = RightProfile {
    category: RightCategory::ProceduralRights,
    name: "Procedural Rights",
    description: "Fair procedure in any legal proceeding",
    key_principle: "Every party is entitled to notice, an opportunity to be heard and a neutral decision-maker",
    common_violations: &[
        "Missed or improper notice of proceedings",
        "Decision entered without opportunity to respond",
    ],
    key_questions: &[
        "Were all deadlines and notices proper?",
        "Was there a chance to respond?",
    ],
    keywords: &["notice", "deadline", "hearing", "filing", "procedure"],
    precedents: &[],
};

static SUBSTANTIVE_RIGHTS: RightProfile = RightProfile {
    category: RightCategory::SubstantiveRights,
    name: "Substantive Rights",
    description: "The underlying legal entitlements at stake",
    key_principle: "Claims and defenses must be grounded in the governing law",
    common_violations: &[
        "Relief denied despite a valid claim",
        "Obligation imposed without legal basis",
    ],
    key_questions: &[
        "Which law governs the dispute?",
        "What are the elements of each claim or defense?",
    ],
    keywords: &["right", "claim", "statute", "remedy", "entitled"],
    precedents: &[],
};

impl RightCategory {
    pub fn profile(&self) -> &'static RightProfile {
        match self {
            Self::FourthAmendment => &FOURTH_AMENDMENT,
            Self::FifthAmendment => &FIFTH_AMENDMENT,
            Self::SixthAmendment => &SIXTH_AMENDMENT,
            Self::EighthAmendment => &EIGHTH_AMENDMENT,
            Self::DueProcess => &DUE_PROCESS,
            Self::Property => &PROPERTY,
            Self::ContractRights => &CONTRACT_RIGHTS,
            Self::TortClaims => &TORT_CLAIMS,
            Self::ParentalRights => &PARENTAL_RIGHTS,
            Self::PropertyDivision => &PROPERTY_DIVISION,
            Self::SupportRights => &SUPPORT_RIGHTS,
            Self::ContractFormation => &CONTRACT_FORMATION,
            Self::ContractPerformance => &CONTRACT_PERFORMANCE,
            Self::ContractDamages => &CONTRACT_DAMAGES,
            Self::ContractInterpretation => &CONTRACT_INTERPRETATION,
            Self::ImmigrationDueProcess => &IMMIGRATION_DUE_PROCESS,
            Self::Asylum => &ASYLUM,
            Self::ImmigrationStatus => &IMMIGRATION_STATUS,
            Self::AutomaticStay => &AUTOMATIC_STAY,
            Self::Discharge => &DISCHARGE,
            Self::Exemptions => &EXEMPTIONS,
            Self::ProceduralRights => &PROCEDURAL_RIGHTS,
            Self::SubstantiveRights => &SUBSTANTIVE_RIGHTS,
        }
    }

    pub fn name(&self) -> &'static str {
        self.profile().name
    }

    /// Number of keywords found in an already lower-cased description
    pub fn keyword_hits(&self, description_lower: &str) -> usize {
        self.profile()
            .keywords
            .iter()
            .filter(|k| description_lower.contains(*k))
            .count()
    }
}

impl fmt::Display for RightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Issue Category Tables
// =============================================================================

/// Rights checked for a case, in table order
pub fn candidate_rights(issue: IssueCategory) -> &'static [RightCategory] {
    use RightCategory::*;
    match issue {
        IssueCategory::Criminal => &[FourthAmendment, FifthAmendment, SixthAmendment, EighthAmendment],
        IssueCategory::Civil | IssueCategory::PersonalInjury | IssueCategory::Housing => {
            &[DueProcess, Property, ContractRights, TortClaims]
        }
        IssueCategory::Family => &[ParentalRights, PropertyDivision, SupportRights],
        IssueCategory::Contract => &[
            ContractFormation,
            ContractPerformance,
            ContractDamages,
            ContractInterpretation,
        ],
        IssueCategory::Immigration => &[ImmigrationDueProcess, Asylum, ImmigrationStatus],
        IssueCategory::Bankruptcy => &[AutomaticStay, Discharge, Exemptions],
        IssueCategory::Other => &[ProceduralRights, SubstantiveRights],
    }
}

/// Rights assumed when no candidate keyword matches
pub fn default_rights(issue: IssueCategory) -> &'static [RightCategory] {
    use RightCategory::*;
    match issue {
        IssueCategory::Criminal => &[FourthAmendment, FifthAmendment],
        IssueCategory::Civil | IssueCategory::PersonalInjury | IssueCategory::Housing => {
            &[DueProcess, TortClaims]
        }
        IssueCategory::Family => &[ParentalRights],
        IssueCategory::Contract => &[ContractPerformance, ContractDamages],
        IssueCategory::Immigration => &[ImmigrationDueProcess],
        IssueCategory::Bankruptcy => &[AutomaticStay, Discharge],
        IssueCategory::Other => &[ProceduralRights, SubstantiveRights],
    }
}

/// A right found relevant to a case and how strongly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RightMatch {
    pub right: RightCategory,
    /// Keyword hits; zero when the right came from the default set
    pub hits: usize,
}

/// Classify a description against the candidate rights of its category.
///
/// Matches keep table order. When nothing matches, the category's default
/// set is returned with zero hits.
pub fn classify(issue: IssueCategory, description: &str) -> Vec<RightMatch> {
    let lower = description.to_lowercase();
    let matched: Vec<RightMatch> = candidate_rights(issue)
        .iter()
        .map(|&right| RightMatch {
            right,
            hits: right.keyword_hits(&lower),
        })
        .filter(|m| m.hits > 0)
        .collect();

    if matched.is_empty() {
        default_rights(issue)
            .iter()
            .map(|&right| RightMatch { right, hits: 0 })
            .collect()
    } else {
        matched
    }
}

/// First precedent with this exact case name
pub fn find_precedent(case_name: &str) -> Option<&'static Precedent> {
    ALL_PROFILES
        .iter()
        .flat_map(|p| p.precedents.iter())
        .find(|p| p.case_name == case_name)
}

static ALL_PROFILES: [&RightProfile; 23] = [
    &FOURTH_AMENDMENT,
    &FIFTH_AMENDMENT,
    &SIXTH_AMENDMENT,
    &EIGHTH_AMENDMENT,
    &DUE_PROCESS,
    &PROPERTY,
    &CONTRACT_RIGHTS,
    &TORT_CLAIMS,
    &PARENTAL_RIGHTS,
    &PROPERTY_DIVISION,
    &SUPPORT_RIGHTS,
    &CONTRACT_FORMATION,
    &CONTRACT_PERFORMANCE,
    &CONTRACT_DAMAGES,
    &CONTRACT_INTERPRETATION,
    &IMMIGRATION_DUE_PROCESS,
    &ASYLUM,
    &IMMIGRATION_STATUS,
    &AUTOMATIC_STAY,
    &DISCHARGE,
    &EXEMPTIONS,
    &PROCEDURAL_RIGHTS,
    &SUBSTANTIVE_RIGHTS,
];
