//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/caseweave/) and project (.caseweave/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::ai::provider::{GenerationOptions, ProviderConfig};
use crate::constants::{prompt, provider, store};
use crate::storage::RetryPolicy;
use crate::types::{CaseError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Primary and secondary provider slots
    pub providers: ProvidersConfig,

    /// Orchestrator tuning
    pub pipeline: PipelineConfig,

    /// Analysis store settings
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            providers: ProvidersConfig::default(),
            pipeline: PipelineConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `CaseError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.pipeline.temperature) {
            return Err(CaseError::Config(format!(
                "pipeline.temperature must be between 0.0 and 2.0, got {}",
                self.pipeline.temperature
            )));
        }

        if self.pipeline.provider_timeout_secs == 0 {
            return Err(CaseError::Config(
                "pipeline.provider_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.max_tokens == 0 {
            return Err(CaseError::Config(
                "pipeline.max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.prompt_context_cap == 0 {
            return Err(CaseError::Config(
                "pipeline.prompt_context_cap must be greater than 0".to_string(),
            ));
        }

        for (slot, config) in [
            ("primary", &self.providers.primary),
            ("secondary", &self.providers.secondary),
        ] {
            if !config.is_supported() {
                return Err(CaseError::Config(format!(
                    "providers.{}.provider '{}' is not supported. Supported: {}",
                    slot,
                    config.provider,
                    ProviderConfig::SUPPORTED.join(", ")
                )));
            }
            if config.timeout_secs == 0 {
                return Err(CaseError::Config(format!(
                    "providers.{}.timeout_secs must be greater than 0",
                    slot
                )));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Provider Slots
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Tried first; JSON mode
    pub primary: ProviderConfig,

    /// Asked only for fields the primary left missing
    pub secondary: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            primary: ProviderConfig::openai(),
            secondary: ProviderConfig::anthropic(),
        }
    }
}

impl ProvidersConfig {
    /// Both slots in the not-configured state
    pub fn offline(&self) -> Self {
        Self {
            primary: self.primary.clone().disabled(),
            secondary: self.secondary.clone().disabled(),
        }
    }
}

// =============================================================================
// Pipeline Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Per-call provider deadline in seconds
    pub provider_timeout_secs: u64,

    /// Maximum characters of knowledge-base context injected into prompts
    pub prompt_context_cap: usize,

    /// Sampling temperature (0.0 = deterministic)
    pub temperature: f32,

    /// Completion size requested from providers
    pub max_tokens: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            provider_timeout_secs: provider::CALL_TIMEOUT_SECS,
            prompt_context_cap: prompt::CONTEXT_CAP_CHARS,
            temperature: provider::DEFAULT_TEMPERATURE,
            max_tokens: provider::DEFAULT_MAX_TOKENS,
        }
    }
}

impl PipelineConfig {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..GenerationOptions::default()
        }
    }
}

// =============================================================================
// Storage Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file
    pub path: PathBuf,

    /// Retries after the first attempt when SQLite reports busy
    pub busy_retries: usize,

    /// Initial backoff between busy retries (milliseconds)
    pub busy_backoff_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(store::DEFAULT_DB_PATH),
            busy_retries: store::BUSY_RETRIES,
            busy_backoff_ms: store::BUSY_BACKOFF_MS,
        }
    }
}

impl StorageConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            busy_retries: self.busy_retries,
            initial_backoff: Duration::from_millis(self.busy_backoff_ms),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.providers.primary.provider, "openai");
        assert_eq!(config.providers.secondary.provider, "anthropic");
        assert_eq!(config.pipeline.provider_timeout_secs, 30);
        assert_eq!(config.pipeline.prompt_context_cap, 1500);
        assert_eq!(config.storage.busy_retries, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut config = Config::default();
        config.pipeline.temperature = 2.5;
        assert!(matches!(config.validate(), Err(CaseError::Config(_))));

        let mut config = Config::default();
        config.pipeline.provider_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pipeline.max_tokens = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pipeline.prompt_context_cap = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut config = Config::default();
        config.providers.secondary.provider = "ollama".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("providers.secondary"));
    }

    #[test]
    fn test_offline_disables_both_slots() {
        let mut providers = ProvidersConfig::default();
        providers.primary.api_key = Some("sk-test".to_string());
        let offline = providers.offline();
        assert!(!offline.primary.enabled);
        assert!(!offline.secondary.enabled);
        assert!(offline.primary.api_key.is_none());
    }

    #[test]
    fn test_generation_options_follow_pipeline() {
        let pipeline = PipelineConfig {
            temperature: 0.7,
            max_tokens: 900,
            ..PipelineConfig::default()
        };
        let options = pipeline.generation_options();
        assert_eq!(options.temperature, 0.7);
        assert_eq!(options.max_tokens, 900);
        assert!(options.json_mode);
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut config = Config::default();
        config.providers.primary.api_key = Some("sk-secret".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
        let toml = toml::to_string(&config).unwrap();
        assert!(!toml.contains("sk-secret"));
    }
}
