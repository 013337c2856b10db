pub mod analysis;
pub mod case;
pub mod error;
pub mod utils;

pub use analysis::{AnalysisKind, FieldSource, StoredAnalysis};
pub use case::{CaseContext, ForumCategory, IssueCategory, ProceedingType};
pub use error::{
    CaseError, ProviderError, ProviderErrorClassifier, ProviderErrorKind, Result, ResultExt,
    TimeoutElapsed,
};
pub use utils::{
    ParseWithDefault, capitalize_first, is_blank_value, log_filter_warn, truncate_chars,
};

// =============================================================================
// Domain Newtypes
// =============================================================================

use std::fmt;

/// Identifier of a case in the surrounding application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaseId(i64);

impl CaseId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CaseId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Lock and persistence key: one current analysis per `(case, kind)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnalysisKey {
    pub case_id: CaseId,
    pub kind: AnalysisKind,
}

impl AnalysisKey {
    pub fn new(case_id: impl Into<CaseId>, kind: AnalysisKind) -> Self {
        Self {
            case_id: case_id.into(),
            kind,
        }
    }
}

impl fmt::Display for AnalysisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.case_id, self.kind)
    }
}

#[cfg(test)]
mod newtype_tests {
    use super::*;

    #[test]
    fn test_analysis_key_display() {
        let key = AnalysisKey::new(42, AnalysisKind::CourtScript);
        assert_eq!(key.to_string(), "42:court_script");
        assert_eq!(key.case_id.get(), 42);
    }

    #[test]
    fn test_keys_distinguish_kind() {
        let a = AnalysisKey::new(1, AnalysisKind::CourtScript);
        let b = AnalysisKey::new(1, AnalysisKind::SuccessProbability);
        assert_ne!(a, b);
    }
}
