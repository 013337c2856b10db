//! Text-Generation Provider Abstraction
//!
//! Defines the `LlmProvider` trait every upstream adapter implements and the
//! normalized reply types the rest of the pipeline consumes.
//!
//! Vendor-specific response shapes are decoded at the adapter boundary into a
//! [`ProviderReply`]; failures come back as a [`ProviderError`] with a
//! classified [`ProviderErrorKind`](crate::types::ProviderErrorKind).
//!
//! ## Modules
//!
//! - `openai`: primary adapter (Chat Completions, JSON mode)
//! - `anthropic`: secondary adapter (Messages API, free text)
//! - `circuit_breaker`: per-slot circuit breaker for provider resilience

mod anthropic;
mod circuit_breaker;
mod openai;

pub use anthropic::AnthropicProvider;
pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerStats, CircuitState,
};
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::ai::validation::JsonRepairer;
use crate::constants::provider as provider_constants;
use crate::types::{CaseError, ProviderError, ProviderErrorClassifier, ProviderErrorKind, Result};

/// Outcome of a single provider call
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Shared provider type for concurrent access across pipeline runs.
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// Request Types
// =============================================================================

/// System and user halves of a rendered prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPrompt {
    pub system: String,
    pub user: String,
}

impl AnalysisPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Per-call generation knobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    /// Ask the vendor for a JSON object when it supports that natively
    pub json_mode: bool,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            json_mode: true,
            temperature: provider_constants::DEFAULT_TEMPERATURE,
            max_tokens: provider_constants::DEFAULT_MAX_TOKENS,
        }
    }
}

// =============================================================================
// Reply Types
// =============================================================================

/// Normalized successful reply
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderReply {
    /// Free text; structure, if any, must still be extracted
    Text(String),
    /// Text the adapter already decoded into a JSON value
    Structured { raw: String, value: Value },
}

impl ProviderReply {
    /// Decode free text, keeping the structured form when a JSON object is
    /// embedded in it.
    pub fn from_text(raw: String) -> Self {
        match JsonRepairer::extract_object(&raw) {
            Some(value) => Self::Structured { raw, value },
            None => Self::Text(raw),
        }
    }

    pub fn raw_text(&self) -> &str {
        match self {
            Self::Text(raw) | Self::Structured { raw, .. } => raw,
        }
    }

    pub fn parsed(&self) -> Option<&Value> {
        match self {
            Self::Text(_) => None,
            Self::Structured { value, .. } => Some(value),
        }
    }
}

/// Record of one provider attempt within a single orchestrator run.
///
/// Never persisted.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub provider_id: String,
    pub raw_text: String,
    pub parsed_json: Option<Value>,
    pub succeeded: bool,
    pub error_kind: Option<ProviderErrorKind>,
}

impl ProviderResponse {
    pub fn from_outcome(provider_id: impl Into<String>, outcome: &ProviderResult<ProviderReply>) -> Self {
        let provider_id = provider_id.into();
        match outcome {
            Ok(reply) => Self {
                provider_id,
                raw_text: reply.raw_text().to_string(),
                parsed_json: reply.parsed().cloned(),
                succeeded: true,
                error_kind: None,
            },
            Err(err) => Self {
                provider_id,
                raw_text: String::new(),
                parsed_json: None,
                succeeded: false,
                error_kind: Some(err.kind),
            },
        }
    }

    /// A response the orchestrator never sent because the slot was skipped
    pub fn skipped(provider_id: impl Into<String>, kind: ProviderErrorKind) -> Self {
        Self {
            provider_id: provider_id.into(),
            raw_text: String::new(),
            parsed_json: None,
            succeeded: false,
            error_kind: Some(kind),
        }
    }
}

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for one provider slot
///
/// Note: API keys are never serialized to output and are redacted in debug
/// output. Adapters convert the key to `SecretString` once at construction.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider type: "openai" or "anthropic"
    pub provider: String,
    /// Model name (provider-specific); vendor default when unset
    pub model: Option<String>,
    /// Model retried once when the first one is reported missing
    pub fallback_model: Option<String>,
    /// HTTP client timeout in seconds
    pub timeout_secs: u64,
    /// Disabled slots never resolve a credential and answer Unauthenticated
    pub enabled: bool,
    /// API key; falls back to the vendor env var when unset
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL (for proxies and tests)
    pub api_base: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("fallback_model", &self.fallback_model)
            .field("timeout_secs", &self.timeout_secs)
            .field("enabled", &self.enabled)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::openai()
    }
}

impl ProviderConfig {
    pub const SUPPORTED: [&'static str; 2] = ["openai", "anthropic"];

    fn for_kind(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            model: None,
            fallback_model: None,
            timeout_secs: provider_constants::HTTP_TIMEOUT_SECS,
            enabled: true,
            api_key: None,
            api_base: None,
        }
    }

    pub fn openai() -> Self {
        Self::for_kind("openai")
    }

    pub fn anthropic() -> Self {
        Self::for_kind("anthropic")
    }

    /// Same slot with credential resolution switched off
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self.api_key = None;
        self
    }

    pub fn is_supported(&self) -> bool {
        Self::SUPPORTED.contains(&self.provider.as_str())
    }

    /// Configured base URL, else `default`; only http(s) is accepted.
    pub(crate) fn resolve_api_base(&self, default: &str) -> Result<String> {
        let base = self.api_base.as_deref().unwrap_or(default);
        let url = url::Url::parse(base).map_err(|e| {
            CaseError::Config(format!("Invalid {} api_base '{}': {}", self.provider, base, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CaseError::Config(format!(
                "{} api_base must use http or https, got: {}",
                self.provider,
                url.scheme()
            )));
        }
        Ok(base.trim_end_matches('/').to_string())
    }

    /// Resolve the credential exactly once: configured key, else `env_var`.
    pub(crate) fn resolve_api_key(&self, env_var: &str) -> Option<SecretString> {
        if !self.enabled {
            return None;
        }
        self.api_key
            .clone()
            .or_else(|| std::env::var(env_var).ok())
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from)
    }
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// Uniform call contract over a vendor's text-generation endpoint
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a reply for `prompt`.
    ///
    /// Adapters without a credential must return `Unauthenticated` without
    /// attempting any I/O.
    async fn generate(
        &self,
        prompt: &AnalysisPrompt,
        options: &GenerationOptions,
    ) -> ProviderResult<ProviderReply>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Whether a credential was resolved at construction
    fn is_configured(&self) -> bool;
}

/// Create a shared provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiProvider::new(config)?)),
        "anthropic" => Ok(Arc::new(AnthropicProvider::new(config)?)),
        other => Err(CaseError::Config(format!(
            "Unknown provider: {}. Supported: {}",
            other,
            ProviderConfig::SUPPORTED.join(", ")
        ))),
    }
}

// =============================================================================
// Shared HTTP Helpers
// =============================================================================

pub(crate) fn build_http_client(config: &ProviderConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(
            crate::constants::network::CONNECTION_TIMEOUT_SECS,
        ))
        .build()
        .map_err(|e| CaseError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Turn a non-success HTTP response into a classified error.
pub(crate) async fn error_from_response(response: reqwest::Response, provider: &str) -> ProviderError {
    let status = response.status().as_u16();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
    let body = response.text().await.unwrap_or_default();

    let err = ProviderErrorClassifier::classify_http_status(status, &body, provider);
    match retry_after {
        Some(d) => err.retry_after(d),
        None => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_from_text_extracts_object() {
        let reply = ProviderReply::from_text("Sure! {\"a\": [1]} hope this helps".to_string());
        assert_eq!(reply.parsed(), Some(&json!({"a": [1]})));
        assert!(reply.raw_text().starts_with("Sure!"));

        let plain = ProviderReply::from_text("no structure here".to_string());
        assert!(plain.parsed().is_none());
    }

    #[test]
    fn test_response_from_outcome() {
        let ok: ProviderResult<ProviderReply> = Ok(ProviderReply::Structured {
            raw: "{}".into(),
            value: json!({}),
        });
        let resp = ProviderResponse::from_outcome("openai", &ok);
        assert!(resp.succeeded);
        assert!(resp.error_kind.is_none());

        let err: ProviderResult<ProviderReply> = Err(ProviderError::not_configured("anthropic"));
        let resp = ProviderResponse::from_outcome("anthropic", &err);
        assert!(!resp.succeeded);
        assert_eq!(resp.error_kind, Some(ProviderErrorKind::Unauthenticated));
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = ProviderConfig {
            api_key: Some("sk-secret".into()),
            ..ProviderConfig::openai()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_config_never_serializes_key() {
        let config = ProviderConfig {
            api_key: Some("sk-secret".into()),
            ..ProviderConfig::anthropic()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }

    #[test]
    fn test_disabled_config_resolves_no_key() {
        let config = ProviderConfig {
            api_key: Some("sk-secret".into()),
            ..ProviderConfig::openai()
        }
        .disabled();
        assert!(config.resolve_api_key("PATH").is_none());
    }

    #[test]
    fn test_blank_key_is_not_a_credential() {
        let config = ProviderConfig {
            api_key: Some("   ".into()),
            ..ProviderConfig::openai()
        };
        assert!(config
            .resolve_api_key("CASEWEAVE_TEST_UNSET_KEY_VAR")
            .is_none());
    }

    #[test]
    fn test_api_base_validation() {
        let config = ProviderConfig::openai();
        assert_eq!(
            config.resolve_api_base("https://api.openai.com/v1/").unwrap(),
            "https://api.openai.com/v1"
        );

        let bad_scheme = ProviderConfig {
            api_base: Some("file:///etc/passwd".into()),
            ..ProviderConfig::openai()
        };
        assert!(matches!(
            bad_scheme.resolve_api_base("https://x"),
            Err(CaseError::Config(_))
        ));

        let garbage = ProviderConfig {
            api_base: Some("not a url".into()),
            ..ProviderConfig::anthropic()
        };
        assert!(garbage.resolve_api_base("https://x").is_err());
    }

    #[test]
    fn test_create_provider_rejects_unknown() {
        let config = ProviderConfig {
            provider: "ollama".into(),
            ..Default::default()
        };
        assert!(matches!(create_provider(&config), Err(CaseError::Config(_))));
    }

    #[test]
    fn test_create_provider_builds_both_kinds() {
        let openai = create_provider(&ProviderConfig::openai().disabled()).unwrap();
        assert_eq!(openai.name(), "openai");
        assert!(!openai.is_configured());

        let anthropic = create_provider(&ProviderConfig::anthropic().disabled()).unwrap();
        assert_eq!(anthropic.name(), "anthropic");
    }
}
