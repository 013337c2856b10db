//! Show Command
//!
//! Print the current stored analysis for a case, or every analysis of the
//! case when no kind is given.

use crate::cli::ui::output::Output;
use crate::cli::util::{CommandContext, OutputFormat};
use crate::types::{AnalysisKind, CaseId, Result, StoredAnalysis};

pub fn run(
    ctx: &CommandContext,
    case_id: i64,
    kind: Option<AnalysisKind>,
    format: OutputFormat,
) -> Result<()> {
    let store = ctx.store()?;
    let case_id = CaseId::new(case_id);

    let analyses: Vec<StoredAnalysis> = match kind {
        Some(kind) => store.get_current(case_id, kind)?.into_iter().collect(),
        None => store.list_for_case(case_id)?,
    };

    match format {
        OutputFormat::Json => {
            let json = match kind {
                Some(_) => serde_json::to_string_pretty(&analyses.first())?,
                None => serde_json::to_string_pretty(&analyses)?,
            };
            println!("{}", json);
        }
        OutputFormat::Text => {
            let output = Output::new();
            if analyses.is_empty() {
                let what = kind.map_or("analyses", |k| k.label());
                output.warning(&format!("No stored {} for case {}", what, case_id));
                output.info("Run 'caseweave generate' to create one");
            }
            for stored in &analyses {
                output.analysis(stored);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_show_missing_is_not_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.path = dir.path().join("a.db");
        let ctx = CommandContext::with_config(config);

        assert!(run(&ctx, 9, Some(AnalysisKind::CourtScript), OutputFormat::Text).is_ok());
        assert!(run(&ctx, 9, None, OutputFormat::Json).is_ok());
    }
}
