pub mod analysis_store;
pub mod database;

pub use analysis_store::{AnalysisDraft, AnalysisStore, RetryPolicy, render_summary};
pub use database::{Database, PoolConfig, SharedDatabase};
