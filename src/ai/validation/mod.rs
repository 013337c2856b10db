//! AI Response Validation
//!
//! Turns untrusted provider output into a per-field [`ValidationReport`]:
//! - JSON extraction and repair for malformed responses
//! - Per-kind required-field schemas
//! - Placeholder sentinel detection
//!
//! ## Design Philosophy
//! - Repair format issues, report structural gaps field by field
//! - Never invent content; filling gaps belongs to the fallback synthesizer

mod json_repair;
mod placeholder;
mod response;
mod schema;

pub use json_repair::{JsonRepairer, RepairStage};
pub use placeholder::{PLACEHOLDER_MARKERS, is_marker, is_placeholder};
pub use response::{IssueSeverity, ResponseValidator, ValidationIssue, ValidationReport};
pub use schema::{AnalysisSchema, FieldShape, FieldSpec, ShapeCheck};

use serde_json::Value;

use crate::types::AnalysisKind;

/// Whether `payload` satisfies every required field of `kind`.
pub fn satisfies_schema(kind: AnalysisKind, payload: &Value) -> bool {
    ResponseValidator::new()
        .validate_value(kind, payload, false)
        .is_complete()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_satisfies_schema() {
        assert!(satisfies_schema(
            AnalysisKind::AdvancedStrategy,
            &json!({"winning_strategy": {"primary_strategy": "Negotiate"}})
        ));
        assert!(!satisfies_schema(
            AnalysisKind::AdvancedStrategy,
            &json!({"winning_strategy": {}})
        ));
    }
}
