//! Resilient Analysis Pipeline
//!
//! The caller boundary for analysis generation. One call to
//! [`AnalysisPipeline::generate_analysis`] drives exactly one
//! [`Orchestrator`] run and persists its result as the single current
//! analysis for `(case_id, kind)`.
//!
//! ## Guarantees
//!
//! - A well-formed `CaseContext` always yields a schema-complete analysis.
//!   Provider failures are absorbed by the orchestrator; only invalid input
//!   and storage failures reach the caller.
//! - Generations for the same key are serialized by a per-key async mutex.
//!   Different keys never contend.
//! - Work runs in a spawned task, so a caller that stops awaiting does not
//!   abort an in-flight generation; it still completes and persists.

mod orchestrator;
mod result;

pub use orchestrator::{Orchestrator, OrchestratorState};
pub use result::ValidatedResult;

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::ai::prompt::AnalysisPromptBuilder;
use crate::ai::provider::create_provider;
use crate::config::Config;
use crate::storage::{AnalysisStore, Database};
use crate::types::{AnalysisKey, AnalysisKind, CaseContext, CaseError, CaseId, Result, StoredAnalysis};

type KeyLocks = DashMap<AnalysisKey, Arc<Mutex<()>>>;

/// Generates, persists and reads analyses
#[derive(Clone)]
pub struct AnalysisPipeline {
    orchestrator: Arc<Orchestrator>,
    store: AnalysisStore,
    locks: Arc<KeyLocks>,
}

impl std::fmt::Debug for AnalysisPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisPipeline")
            .field("locked_keys", &self.locks.len())
            .finish()
    }
}

impl AnalysisPipeline {
    pub fn new(orchestrator: Orchestrator, store: AnalysisStore) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            store,
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Build adapters, orchestrator and store from configuration.
    ///
    /// With `offline` both provider slots are built in the not-configured
    /// state, so every run is answered by fallback synthesis.
    pub fn from_config(config: &Config, offline: bool) -> Result<Self> {
        let providers = if offline {
            config.providers.offline()
        } else {
            config.providers.clone()
        };

        let primary = create_provider(&providers.primary)?;
        let secondary = create_provider(&providers.secondary)?;
        info!(
            primary = primary.name(),
            primary_configured = primary.is_configured(),
            secondary = secondary.name(),
            secondary_configured = secondary.is_configured(),
            "Providers initialized"
        );

        let orchestrator = Orchestrator::new(primary, secondary)
            .with_timeout(config.pipeline.provider_timeout())
            .with_prompts(AnalysisPromptBuilder::new(config.pipeline.prompt_context_cap))
            .with_options(config.pipeline.generation_options());

        let db = Arc::new(Database::open(&config.storage.path)?);
        let store = AnalysisStore::with_retry(db, config.storage.retry_policy());

        Ok(Self::new(orchestrator, store))
    }

    pub fn store(&self) -> &AnalysisStore {
        &self.store
    }

    /// Generate `kind` for the case and make it the current analysis.
    ///
    /// Fails only with `InputInvalid` (before any work starts) or with a
    /// storage error after the store's own retries are exhausted.
    #[instrument(skip(self, ctx), fields(case_id = %case_id, kind = %kind))]
    pub async fn generate_analysis(
        &self,
        case_id: CaseId,
        ctx: &CaseContext,
        kind: AnalysisKind,
    ) -> Result<StoredAnalysis> {
        ctx.validate()?;

        let key = AnalysisKey::new(case_id, kind);
        let ctx = ctx.clone();
        let orchestrator = Arc::clone(&self.orchestrator);
        let store = self.store.clone();
        let locks = Arc::clone(&self.locks);

        let task = tokio::spawn(async move {
            let lock = locks
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone();

            let outcome = {
                let _guard = lock.lock().await;
                Self::generate_locked(&orchestrator, store, key, &ctx).await
            };

            drop(lock);
            locks.remove_if(&key, |_, l| Arc::strong_count(l) == 1);
            outcome
        });

        task.await
            .map_err(|e| CaseError::Internal(format!("Generation task failed: {}", e)))?
    }

    async fn generate_locked(
        orchestrator: &Orchestrator,
        store: AnalysisStore,
        key: AnalysisKey,
        ctx: &CaseContext,
    ) -> Result<StoredAnalysis> {
        let result = orchestrator.run(ctx, key.kind).await;
        debug!(
            key = %key,
            trace = ?result.trace,
            confidence = result.confidence_score,
            "Persisting analysis"
        );

        let draft = result.into_draft();
        tokio::task::spawn_blocking(move || store.replace(key.case_id, key.kind, &draft))
            .await
            .map_err(|e| CaseError::Internal(format!("Persistence task failed: {}", e)))?
    }

    /// The current analysis for `(case_id, kind)`, if any
    pub async fn get_current(
        &self,
        case_id: CaseId,
        kind: AnalysisKind,
    ) -> Result<Option<StoredAnalysis>> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.get_current(case_id, kind))
            .await
            .map_err(|e| CaseError::Internal(format!("Read task failed: {}", e)))?
    }

    /// Keys with a generation in flight or queued
    pub fn active_keys(&self) -> usize {
        self.locks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::ProviderConfig;
    use crate::ai::validation::{AnalysisSchema, is_placeholder, satisfies_schema};
    use crate::types::{FieldSource, ForumCategory, IssueCategory};
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn offline_orchestrator() -> Orchestrator {
        let primary = create_provider(&ProviderConfig::openai().disabled()).unwrap();
        let secondary = create_provider(&ProviderConfig::anthropic().disabled()).unwrap();
        Orchestrator::new(primary, secondary)
    }

    fn in_memory_pipeline() -> AnalysisPipeline {
        let db = Arc::new(Database::open_in_memory().unwrap());
        AnalysisPipeline::new(offline_orchestrator(), AnalysisStore::new(db))
    }

    fn car_search() -> CaseContext {
        CaseContext::new(
            "officer searched my car without a warrant",
            IssueCategory::Criminal,
            ForumCategory::State,
        )
    }

    fn assert_stored_complete(stored: &StoredAnalysis) {
        assert!(satisfies_schema(stored.kind, &stored.structured_payload));
        for spec in AnalysisSchema::for_kind(stored.kind).fields {
            assert!(!is_placeholder(spec, &stored.structured_payload[spec.name]));
        }
    }

    #[tokio::test]
    async fn test_generate_offline_rights_analysis() {
        let pipeline = in_memory_pipeline();
        let stored = pipeline
            .generate_analysis(CaseId::new(1), &car_search(), AnalysisKind::RightsAndCaseLaw)
            .await
            .unwrap();

        assert_stored_complete(&stored);
        assert_eq!(stored.version, 1);
        assert!((stored.confidence_score - 0.60).abs() < 1e-9);
        assert!(stored.sources.values().all(|s| *s == FieldSource::Fallback));
        assert!(stored.content.contains("Fourth Amendment"));
    }

    #[tokio::test]
    async fn test_regenerate_supersedes() {
        let pipeline = in_memory_pipeline();
        let case = CaseId::new(7);
        let first = pipeline
            .generate_analysis(case, &car_search(), AnalysisKind::DocumentRecommendations)
            .await
            .unwrap();
        let second = pipeline
            .generate_analysis(case, &car_search(), AnalysisKind::DocumentRecommendations)
            .await
            .unwrap();

        assert_eq!(second.version, 2);
        assert_ne!(first.id, second.id);
        assert!(second.generated_at >= first.generated_at);

        let current = pipeline
            .get_current(case, AnalysisKind::DocumentRecommendations)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.id, second.id);
        assert_eq!(pipeline.store().list_for_case(case).unwrap().len(), 1);
        assert_eq!(
            current.structured_payload["document_recommendations"][0]["document_type"],
            "Discovery Request"
        );
    }

    #[tokio::test]
    async fn test_blank_description_is_rejected() {
        let pipeline = in_memory_pipeline();
        let ctx = CaseContext::new("   ", IssueCategory::Civil, ForumCategory::State);
        let err = pipeline
            .generate_analysis(CaseId::new(1), &ctx, AnalysisKind::CourtScript)
            .await
            .unwrap_err();

        assert!(matches!(err, CaseError::InputInvalid { .. }));
        assert!(err.is_user_visible());
        assert!(
            pipeline
                .get_current(CaseId::new(1), AnalysisKind::CourtScript)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_same_key_serialized() {
        let dir = TempDir::new().unwrap();
        let db = Arc::new(Database::open(dir.path().join("analyses.db")).unwrap());
        let pipeline = AnalysisPipeline::new(offline_orchestrator(), AnalysisStore::new(db));
        let case = CaseId::new(3);

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let pipeline = pipeline.clone();
                tokio::spawn(async move {
                    pipeline
                        .generate_analysis(case, &car_search(), AnalysisKind::SuccessProbability)
                        .await
                })
            })
            .collect();

        let mut versions = Vec::new();
        for handle in handles {
            versions.push(handle.await.unwrap().unwrap().version);
        }
        versions.sort_unstable();
        assert_eq!(versions, (1..=6).collect::<Vec<u32>>());

        let rows = pipeline.store().list_for_case(case).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].version, 6);
        assert_eq!(pipeline.active_keys(), 0);
    }

    #[tokio::test]
    async fn test_different_kinds_are_independent() {
        let pipeline = in_memory_pipeline();
        let case = CaseId::new(11);
        let (ctx_a, ctx_b) = (car_search(), car_search());
        let (a, b) = tokio::join!(
            pipeline.generate_analysis(case, &ctx_a, AnalysisKind::CourtScript),
            pipeline.generate_analysis(case, &ctx_b, AnalysisKind::AdvancedStrategy),
        );
        assert_eq!(a.unwrap().version, 1);
        assert_eq!(b.unwrap().version, 1);
        assert_eq!(pipeline.store().list_for_case(case).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_abandoned_call_still_persists() {
        let pipeline = in_memory_pipeline();
        let case = CaseId::new(21);
        {
            let ctx = car_search();
            let fut = pipeline.generate_analysis(case, &ctx, AnalysisKind::CourtScript);
            // Poll once so the task is spawned, then drop the caller's future
            let _ = tokio::time::timeout(std::time::Duration::from_millis(1), fut).await;
        }

        let mut current = None;
        for _ in 0..200 {
            current = pipeline
                .get_current(case, AnalysisKind::CourtScript)
                .await
                .unwrap();
            if current.is_some() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_stored_complete(&current.unwrap());
    }

    #[test]
    fn test_from_config_offline() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.path = dir.path().join("db").join("analyses.db");

        let pipeline = AnalysisPipeline::from_config(&config, true).unwrap();
        let rt = tokio::runtime::Runtime::new().unwrap();
        let stored = rt
            .block_on(pipeline.generate_analysis(
                CaseId::new(5),
                &car_search(),
                AnalysisKind::InterviewAnalysis,
            ))
            .unwrap();
        assert_stored_complete(&stored);
        assert!(config.storage.path.exists());
    }

    fn issue_strategy() -> impl Strategy<Value = IssueCategory> {
        prop::sample::select(IssueCategory::ALL.to_vec())
    }

    fn forum_strategy() -> impl Strategy<Value = ForumCategory> {
        prop::sample::select(vec![
            ForumCategory::Federal,
            ForumCategory::State,
            ForumCategory::Municipal,
            ForumCategory::Tribal,
            ForumCategory::Administrative,
            ForumCategory::Other,
        ])
    }

    fn kind_strategy() -> impl Strategy<Value = AnalysisKind> {
        prop::sample::select(AnalysisKind::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_offline_results_never_missing_or_placeholder(
            description in "[a-zA-Z ,.]{1,120}",
            issue in issue_strategy(),
            forum in forum_strategy(),
            kind in kind_strategy(),
        ) {
            prop_assume!(!description.trim().is_empty());
            let pipeline = in_memory_pipeline();
            let ctx = CaseContext::new(description, issue, forum)
                .with_evidence(["dashcam video", "witness statement"]);

            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let stored = rt
                .block_on(pipeline.generate_analysis(CaseId::new(1), &ctx, kind))
                .unwrap();

            prop_assert!(satisfies_schema(kind, &stored.structured_payload));
            for spec in AnalysisSchema::for_kind(kind).fields {
                prop_assert!(!is_placeholder(spec, &stored.structured_payload[spec.name]));
            }
            prop_assert!((0.0..=1.0).contains(&stored.confidence_score));
        }
    }
}
