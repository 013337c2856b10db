//! Generate Command
//!
//! Run one analysis for a case and persist it as the current version.
//!
//! Usage:
//!   caseweave generate --case-id 42 --kind rights_and_case_law \
//!       --issue criminal --forum state --description "..." [--offline]

use crate::cli::ui::output::Output;
use crate::cli::util::{CommandContext, OutputFormat};
use crate::types::{AnalysisKind, CaseContext, CaseId, ProceedingType, Result};

#[derive(Debug, Clone)]
pub struct GenerateArgs {
    pub case_id: i64,
    pub kind: AnalysisKind,
    pub issue: String,
    pub forum: String,
    pub description: String,
    pub proceeding: Option<String>,
    pub evidence: Vec<String>,
    pub format: OutputFormat,
    pub offline: bool,
}

impl GenerateArgs {
    /// Validated case context; blank description or categories are rejected
    pub fn case_context(&self) -> Result<CaseContext> {
        let mut ctx = CaseContext::parse(&self.description, &self.issue, &self.forum)?
            .with_evidence(self.evidence.iter().map(|e| e.trim()).filter(|e| !e.is_empty()));
        if let Some(proceeding) = &self.proceeding {
            ctx = ctx.with_proceeding(proceeding.parse::<ProceedingType>()?);
        }
        Ok(ctx)
    }
}

pub async fn run(ctx: &CommandContext, args: GenerateArgs) -> Result<()> {
    let case = args.case_context()?;
    let pipeline = ctx.pipeline(args.offline)?;
    let output = Output::new();

    if args.offline && args.format == OutputFormat::Text {
        output.info("Offline mode: analysis comes from the local knowledge base only");
    }

    let stored = pipeline
        .generate_analysis(CaseId::new(args.case_id), &case, args.kind)
        .await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stored)?),
        OutputFormat::Text => {
            output.analysis(&stored);
            if stored.is_fallback_only() && !args.offline {
                output.warning("No provider answered; every field was synthesized locally");
            }
            output.success(&format!(
                "Saved {} v{} for case {}",
                stored.kind, stored.version, stored.case_id
            ));
        }
    }
    Ok(())
}
