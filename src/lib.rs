//! CaseWeave - Resilient Legal Case Analysis
//!
//! Generates structured legal analyses (rights assessments, document
//! recommendations, court scripts and more) for self-represented litigants.
//! Each analysis is produced by a primary text-generation provider, gaps are
//! filled by a secondary provider, and anything still missing is synthesized
//! from a static knowledge base. A well-formed case always gets a complete
//! analysis.
//!
//! ## Core Features
//!
//! - **Provider Chain**: primary then secondary, each under a deadline and a
//!   circuit breaker
//! - **Field-Level Merge**: partial provider answers are kept; only missing
//!   fields are requested again or synthesized
//! - **Deterministic Fallback**: keyword-driven synthesis from static legal
//!   knowledge
//! - **Versioned Storage**: one current analysis per case and kind in SQLite
//!
//! ## Quick Start
//!
//! ```ignore
//! use caseweave::{AnalysisPipeline, CaseContext, CaseId, Config};
//! use caseweave::types::{AnalysisKind, ForumCategory, IssueCategory};
//!
//! let pipeline = AnalysisPipeline::from_config(&Config::default(), false)?;
//! let ctx = CaseContext::new(
//!     "officer searched my car without a warrant",
//!     IssueCategory::Criminal,
//!     ForumCategory::State,
//! );
//! let stored = pipeline
//!     .generate_analysis(CaseId::new(42), &ctx, AnalysisKind::RightsAndCaseLaw)
//!     .await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: provider adapters, prompts, response validation
//! - [`knowledge`]: static rights, precedents and document strategies
//! - [`fallback`]: local synthesis of missing fields
//! - [`pipeline`]: orchestrator state machine and caller boundary
//! - [`storage`]: SQLite persistence with connection pooling
//! - [`config`]: layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod fallback;
pub mod knowledge;
pub mod pipeline;
pub mod storage;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{CaseError, ProviderError, ProviderErrorKind, Result, ResultExt};

// Domain
pub use types::{AnalysisKey, AnalysisKind, CaseContext, CaseId, StoredAnalysis};

// Storage
pub use storage::database::PoolConfig;
pub use storage::{AnalysisStore, Database, SharedDatabase};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use fallback::FallbackSynthesizer;
pub use knowledge::KnowledgeBase;
pub use pipeline::{AnalysisPipeline, Orchestrator, OrchestratorState, ValidatedResult};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    LlmProvider, ProviderConfig, ResponseValidator, SharedProvider, TimeoutConfig,
    create_provider, with_timeout,
};
