//! CLI Common Utilities
//!
//! Shared initialization and context management for CLI commands.

use std::sync::Arc;

use crate::config::{Config, ConfigLoader};
use crate::pipeline::AnalysisPipeline;
use crate::storage::{AnalysisStore, Database};
use crate::types::Result;

/// Output format shared by `generate` and `show`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Command execution context
///
/// Holds the merged configuration; pipeline and store are opened on demand
/// so commands that only read never construct provider adapters.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
}

impl CommandContext {
    pub fn load() -> Result<Self> {
        Ok(Self {
            config: ConfigLoader::load()?,
        })
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Full pipeline; `offline` skips every provider
    pub fn pipeline(&self, offline: bool) -> Result<AnalysisPipeline> {
        AnalysisPipeline::from_config(&self.config, offline)
    }

    /// Store only, for read commands
    pub fn store(&self) -> Result<AnalysisStore> {
        let db = Database::open(&self.config.storage.path)?;
        Ok(AnalysisStore::with_retry(
            Arc::new(db),
            self.config.storage.retry_policy(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalysisKind, CaseId};

    #[test]
    fn test_store_opens_configured_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.path = dir.path().join("nested").join("a.db");

        let ctx = CommandContext::with_config(config);
        let store = ctx.store().unwrap();
        assert!(ctx.config.storage.path.exists());
        assert!(
            store
                .get_current(CaseId::new(1), AnalysisKind::CourtScript)
                .unwrap()
                .is_none()
        );
    }
}
