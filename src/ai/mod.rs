//! AI Integration Layer
//!
//! Provider adapters, prompt construction, response validation and call
//! deadlines for analysis generation.

pub mod prompt;
pub mod provider;
pub mod timeout;
pub mod validation;

pub use prompt::{AnalysisPromptBuilder, PromptBuilder, PromptSection};
pub use provider::{
    AnalysisPrompt, AnthropicProvider, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerStats,
    CircuitState, GenerationOptions, LlmProvider, OpenAiProvider, ProviderConfig, ProviderReply,
    ProviderResponse, ProviderResult, SharedProvider, create_provider,
};
pub use timeout::{TimeoutConfig, with_timeout};
pub use validation::{
    AnalysisSchema, JsonRepairer, ResponseValidator, ValidationReport, is_placeholder,
    satisfies_schema,
};
