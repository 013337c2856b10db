//! Kinds Command
//!
//! List every analysis kind with its persistence key and required fields.

use crate::ai::validation::AnalysisSchema;
use crate::cli::ui::output::Output;
use crate::types::AnalysisKind;

pub fn run() {
    let output = Output::new();
    output.header("Analysis kinds");

    for kind in AnalysisKind::ALL {
        println!();
        println!("  {:<26} {}", kind.as_str(), kind.label());
        let fields: Vec<&str> = AnalysisSchema::for_kind(kind).field_names().collect();
        println!("  {:<26} fields: {}", "", fields.join(", "));
        if kind.uses_evidence() {
            println!("  {:<26} uses --evidence", "");
        }
    }
}
