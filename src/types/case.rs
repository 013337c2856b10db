//! Case input types
//!
//! `CaseContext` is the immutable input handed to every pipeline stage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{CaseError, Result};

/// Area of law a case belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Criminal,
    Civil,
    PersonalInjury,
    Housing,
    Contract,
    Family,
    Bankruptcy,
    Immigration,
    /// Any category without a dedicated rule set
    Other,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 9] = [
        Self::Criminal,
        Self::Civil,
        Self::PersonalInjury,
        Self::Housing,
        Self::Contract,
        Self::Family,
        Self::Bankruptcy,
        Self::Immigration,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Criminal => "criminal",
            Self::Civil => "civil",
            Self::PersonalInjury => "personal_injury",
            Self::Housing => "housing",
            Self::Contract => "contract",
            Self::Family => "family",
            Self::Bankruptcy => "bankruptcy",
            Self::Immigration => "immigration",
            Self::Other => "other",
        }
    }

    /// Human label used in prompts and summaries
    pub fn label(&self) -> &'static str {
        match self {
            Self::Criminal => "Criminal",
            Self::Civil => "Civil",
            Self::PersonalInjury => "Personal Injury",
            Self::Housing => "Housing",
            Self::Contract => "Contract",
            Self::Family => "Family",
            Self::Bankruptcy => "Bankruptcy",
            Self::Immigration => "Immigration",
            Self::Other => "General",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueCategory {
    type Err = CaseError;

    /// Unknown names map to `Other`; only blank input is rejected.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = normalize(s);
        if normalized.is_empty() {
            return Err(CaseError::input("issue_category", "must not be empty"));
        }
        Ok(match normalized.as_str() {
            "criminal" => Self::Criminal,
            "civil" => Self::Civil,
            "personal_injury" => Self::PersonalInjury,
            "housing" => Self::Housing,
            "contract" | "business" => Self::Contract,
            "family" => Self::Family,
            "bankruptcy" => Self::Bankruptcy,
            "immigration" => Self::Immigration,
            _ => Self::Other,
        })
    }
}

/// Kind of court or tribunal hearing the case
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ForumCategory {
    Federal,
    State,
    Municipal,
    Tribal,
    Administrative,
    Other,
}

impl ForumCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Federal => "federal",
            Self::State => "state",
            Self::Municipal => "municipal",
            Self::Tribal => "tribal",
            Self::Administrative => "administrative",
            Self::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Federal => "Federal Court",
            Self::State => "State Court",
            Self::Municipal => "Municipal Court",
            Self::Tribal => "Tribal Court",
            Self::Administrative => "Administrative Tribunal",
            Self::Other => "Court",
        }
    }
}

impl fmt::Display for ForumCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForumCategory {
    type Err = CaseError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = normalize(s);
        if normalized.is_empty() {
            return Err(CaseError::input("forum_category", "must not be empty"));
        }
        if normalized.contains("tribal") || normalized.contains("cfr") {
            return Ok(Self::Tribal);
        }
        Ok(match normalized.as_str() {
            "federal" | "federal_court" => Self::Federal,
            "state" | "state_court" | "county" => Self::State,
            "municipal" | "city" | "municipal_court" => Self::Municipal,
            "administrative" | "agency" | "immigration_court" => Self::Administrative,
            _ => Self::Other,
        })
    }
}

/// Court proceeding a script is prepared for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProceedingType {
    #[default]
    Arraignment,
    BailHearing,
    PreliminaryHearing,
    MotionHearing,
    SuppressionHearing,
    Trial,
    Sentencing,
}

impl ProceedingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arraignment => "arraignment",
            Self::BailHearing => "bail_hearing",
            Self::PreliminaryHearing => "preliminary_hearing",
            Self::MotionHearing => "motion_hearing",
            Self::SuppressionHearing => "suppression_hearing",
            Self::Trial => "trial",
            Self::Sentencing => "sentencing",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Arraignment => "Arraignment",
            Self::BailHearing => "Bail Hearing",
            Self::PreliminaryHearing => "Preliminary Hearing",
            Self::MotionHearing => "Motion Hearing",
            Self::SuppressionHearing => "Suppression Hearing",
            Self::Trial => "Trial",
            Self::Sentencing => "Sentencing",
        }
    }
}

impl FromStr for ProceedingType {
    type Err = CaseError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "arraignment" => Ok(Self::Arraignment),
            "bail_hearing" | "bail" => Ok(Self::BailHearing),
            "preliminary_hearing" | "preliminary" => Ok(Self::PreliminaryHearing),
            "motion_hearing" | "motion" => Ok(Self::MotionHearing),
            "suppression_hearing" | "suppression" => Ok(Self::SuppressionHearing),
            "trial" => Ok(Self::Trial),
            "sentencing" => Ok(Self::Sentencing),
            other => Err(CaseError::input(
                "proceeding",
                format!("unknown proceeding type '{}'", other),
            )),
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace(['-', ' '], "_")
}

// =============================================================================
// CaseContext
// =============================================================================

/// Immutable case input supplied by the surrounding application
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseContext {
    pub description: String,
    pub issue_category: IssueCategory,
    pub forum_category: ForumCategory,
    /// Hearing a court script targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proceeding: Option<ProceedingType>,
    /// Free-text evidence descriptions, in exhibit order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<String>,
}

impl CaseContext {
    pub fn new(
        description: impl Into<String>,
        issue_category: IssueCategory,
        forum_category: ForumCategory,
    ) -> Self {
        Self {
            description: description.into(),
            issue_category,
            forum_category,
            proceeding: None,
            evidence: Vec::new(),
        }
    }

    /// Build from the raw strings a form or API hands over.
    pub fn parse(description: &str, issue_category: &str, forum_category: &str) -> Result<Self> {
        let ctx = Self::new(
            description.trim(),
            issue_category.parse()?,
            forum_category.parse()?,
        );
        ctx.validate()?;
        Ok(ctx)
    }

    pub fn with_proceeding(mut self, proceeding: ProceedingType) -> Self {
        self.proceeding = Some(proceeding);
        self
    }

    pub fn with_evidence<I, S>(mut self, evidence: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.evidence = evidence.into_iter().map(Into::into).collect();
        self
    }

    /// Reject input no pipeline run should be attempted for.
    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(CaseError::input("description", "must not be empty"));
        }
        Ok(())
    }

    pub fn proceeding_or_default(&self) -> ProceedingType {
        self.proceeding.unwrap_or_default()
    }

    pub fn description_lower(&self) -> String {
        self.description.to_lowercase()
    }
}
