//! Analysis Orchestrator
//!
//! Drives one analysis through the provider chain:
//!
//! ```text
//! Init -> TryPrimary -> Validate -> { Complete | TrySecondary }
//!      TrySecondary -> Validate2 -> { Complete | PatchMissing }
//!      PatchMissing -> Complete
//! ```
//!
//! A provider that errors, times out or sits behind an open circuit breaker
//! is skipped without surfacing anything to the caller. Fields a provider
//! satisfies are kept; the secondary is asked only for what is still
//! missing, and fallback synthesis fills the rest. `Complete` is the only
//! terminal state.

use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::result::{FieldCollector, ValidatedResult};
use crate::ai::prompt::AnalysisPromptBuilder;
use crate::ai::provider::{
    CircuitBreaker, CircuitBreakerConfig, GenerationOptions, ProviderReply, ProviderResponse,
    ProviderResult, SharedProvider,
};
use crate::ai::timeout::{TimeoutConfig, with_timeout};
use crate::ai::validation::ResponseValidator;
use crate::fallback::FallbackSynthesizer;
use crate::types::{
    AnalysisKind, CaseContext, FieldSource, ProviderError, ProviderErrorKind,
};

/// States of one orchestrator run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Init,
    TryPrimary,
    Validate,
    TrySecondary,
    Validate2,
    PatchMissing,
    Complete,
}

impl std::fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Init => "INIT",
            Self::TryPrimary => "TRY_PRIMARY",
            Self::Validate => "VALIDATE",
            Self::TrySecondary => "TRY_SECONDARY",
            Self::Validate2 => "VALIDATE_2",
            Self::PatchMissing => "PATCH_MISSING",
            Self::Complete => "COMPLETE",
        };
        f.write_str(name)
    }
}

/// One provider with its breaker
struct ProviderSlot {
    source: FieldSource,
    provider: SharedProvider,
    breaker: CircuitBreaker,
}

impl ProviderSlot {
    fn new(source: FieldSource, provider: SharedProvider, config: CircuitBreakerConfig) -> Self {
        let name = match source {
            FieldSource::Primary => "primary",
            FieldSource::Secondary => "secondary",
            FieldSource::Fallback => "fallback",
        };
        Self {
            source,
            breaker: CircuitBreaker::new(name, config),
            provider,
        }
    }
}

/// Trace plus field state of a run in progress
struct Run {
    trace: Vec<OrchestratorState>,
    collector: FieldCollector,
    attempts: Vec<ProviderResponse>,
}

impl Run {
    fn enter(&mut self, state: OrchestratorState) {
        debug!(state = %state, "Orchestrator transition");
        self.trace.push(state);
    }
}

pub struct Orchestrator {
    primary: ProviderSlot,
    secondary: ProviderSlot,
    prompts: AnalysisPromptBuilder,
    validator: ResponseValidator,
    fallback: FallbackSynthesizer,
    timeouts: TimeoutConfig,
    options: GenerationOptions,
}

impl Orchestrator {
    pub fn new(primary: SharedProvider, secondary: SharedProvider) -> Self {
        Self::with_breaker_config(primary, secondary, CircuitBreakerConfig::default())
    }

    pub fn with_breaker_config(
        primary: SharedProvider,
        secondary: SharedProvider,
        breaker: CircuitBreakerConfig,
    ) -> Self {
        Self {
            primary: ProviderSlot::new(FieldSource::Primary, primary, breaker.clone()),
            secondary: ProviderSlot::new(FieldSource::Secondary, secondary, breaker),
            prompts: AnalysisPromptBuilder::default(),
            validator: ResponseValidator::new(),
            fallback: FallbackSynthesizer::new(),
            timeouts: TimeoutConfig::default(),
            options: GenerationOptions::default(),
        }
    }

    /// Per-call provider deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.provider_call = timeout;
        self
    }

    pub fn with_prompts(mut self, prompts: AnalysisPromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Run `kind` for `ctx` to completion. Never fails.
    #[instrument(skip_all, fields(kind = %kind, issue = %ctx.issue_category))]
    pub async fn run(&self, ctx: &CaseContext, kind: AnalysisKind) -> ValidatedResult {
        let mut run = Run {
            trace: vec![OrchestratorState::Init],
            collector: FieldCollector::new(kind),
            attempts: Vec::new(),
        };

        run.enter(OrchestratorState::TryPrimary);
        if let Some(reply) = self.attempt(&self.primary, ctx, kind, None, &mut run).await {
            run.enter(OrchestratorState::Validate);
            self.absorb(&self.primary, kind, &reply, &mut run);
        }

        if !run.collector.is_complete() {
            let missing = run.collector.missing();
            run.enter(OrchestratorState::TrySecondary);
            if let Some(reply) = self
                .attempt(&self.secondary, ctx, kind, Some(&missing), &mut run)
                .await
            {
                run.enter(OrchestratorState::Validate2);
                self.absorb(&self.secondary, kind, &reply, &mut run);
            }
        }

        if !run.collector.is_complete() {
            run.enter(OrchestratorState::PatchMissing);
            let patched = self
                .fallback
                .synthesize_missing(ctx, kind, &run.collector.as_report());
            info!(fields = ?patched.keys().collect::<Vec<_>>(), "Patched missing fields from fallback");
            run.collector.patch(patched);
        }

        run.enter(OrchestratorState::Complete);
        let result = run.collector.finish(run.trace, run.attempts);
        debug!(confidence = result.confidence_score, "Orchestrator run complete");
        result
    }

    /// Call one slot; `None` when it was skipped or failed.
    async fn attempt(
        &self,
        slot: &ProviderSlot,
        ctx: &CaseContext,
        kind: AnalysisKind,
        only_fields: Option<&[&str]>,
        run: &mut Run,
    ) -> Option<ProviderReply> {
        let name = slot.provider.name().to_string();

        if !slot.breaker.allow_request() {
            debug!(provider = %name, breaker = %slot.breaker.stats().summary(), "Circuit open, skipping provider");
            run.attempts
                .push(ProviderResponse::skipped(&name, ProviderErrorKind::Unknown));
            return None;
        }

        let prompt = match only_fields {
            Some(fields) => self.prompts.build_for_fields(ctx, kind, fields),
            None => self.prompts.build(ctx, kind),
        };
        let outcome: ProviderResult<ProviderReply> = with_timeout(
            self.timeouts.provider_call,
            slot.provider.generate(&prompt, &self.options),
            "provider call",
        )
        .await
        .map_err(|e: ProviderError| match e.provider {
            Some(_) => e,
            None => e.provider(&name),
        });

        slot.breaker.record(&outcome);
        run.attempts.push(ProviderResponse::from_outcome(&name, &outcome));

        match outcome {
            Ok(reply) => Some(reply),
            Err(err) if err.kind == ProviderErrorKind::Unauthenticated => {
                debug!(provider = %name, "Provider not configured, skipping");
                None
            }
            Err(err) => {
                warn!(provider = %name, kind = %err.kind, error = %err, "Provider call failed");
                None
            }
        }
    }

    fn absorb(&self, slot: &ProviderSlot, kind: AnalysisKind, reply: &ProviderReply, run: &mut Run) {
        let report = self.validator.validate_reply(kind, reply);
        let taken = run.collector.absorb(&report, slot.source);
        debug!(
            provider = slot.provider.name(),
            taken = ?taken,
            missing = ?report.missing,
            repaired = report.was_repaired,
            "Validated provider reply"
        );
    }
}
