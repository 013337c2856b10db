//! Anthropic Messages API Provider
//!
//! Secondary adapter. The Messages API has no JSON mode, so replies arrive as
//! free text and are coerced into structure by extracting the first embedded
//! JSON object.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{
    AnalysisPrompt, GenerationOptions, LlmProvider, ProviderConfig, ProviderReply, ProviderResult,
    build_http_client, error_from_response,
};
use crate::constants::provider::anthropic as defaults;
use crate::types::{ProviderError, ProviderErrorClassifier, ProviderErrorKind, Result};

const PROVIDER_NAME: &str = "anthropic";

/// Reminder appended to the system prompt in place of a native JSON mode
const JSON_INSTRUCTION: &str = "Respond ONLY with a single valid JSON object, no explanation.";

pub struct AnthropicProvider {
    api_key: Option<SecretString>,
    api_base: String,
    model: String,
    fallback_model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("fallback_model", &self.fallback_model)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            api_key: config.resolve_api_key(defaults::API_KEY_ENV),
            api_base: config.resolve_api_base(defaults::API_BASE)?,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| defaults::DEFAULT_MODEL.to_string()),
            fallback_model: config
                .fallback_model
                .clone()
                .unwrap_or_else(|| defaults::FALLBACK_MODEL.to_string()),
            client: build_http_client(config)?,
        })
    }

    fn build_request(
        &self,
        model: &str,
        prompt: &AnalysisPrompt,
        options: &GenerationOptions,
    ) -> MessagesRequest {
        let system = if options.json_mode {
            format!("{}\n\n{}", prompt.system, JSON_INSTRUCTION)
        } else {
            prompt.system.clone()
        };

        MessagesRequest {
            model: model.to_string(),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            system,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.user.clone(),
            }],
        }
    }

    async fn call_model(
        &self,
        api_key: &SecretString,
        model: &str,
        prompt: &AnalysisPrompt,
        options: &GenerationOptions,
    ) -> ProviderResult<ProviderReply> {
        let request = self.build_request(model, prompt, options);
        let url = format!("{}/messages", self.api_base);

        debug!(model, "Sending request to Anthropic API");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", defaults::API_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderErrorClassifier::classify_transport(&e, PROVIDER_NAME))?;

        if !response.status().is_success() {
            return Err(error_from_response(response, PROVIDER_NAME).await);
        }

        let body: MessagesResponse = response.json().await.map_err(|e| {
            ProviderError::with_provider(
                ProviderErrorKind::Unknown,
                format!("Failed to parse Anthropic response: {}", e),
                PROVIDER_NAME,
            )
        })?;

        let text = body.text();
        if text.trim().is_empty() {
            return Err(ProviderError::with_provider(
                ProviderErrorKind::Unknown,
                "No text content in Anthropic response",
                PROVIDER_NAME,
            ));
        }

        Ok(ProviderReply::from_text(text))
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn generate(
        &self,
        prompt: &AnalysisPrompt,
        options: &GenerationOptions,
    ) -> ProviderResult<ProviderReply> {
        let Some(api_key) = &self.api_key else {
            return Err(ProviderError::not_configured(PROVIDER_NAME));
        };

        let first = self.call_model(api_key, &self.model, prompt, options).await;
        match first {
            Err(err)
                if err.kind == ProviderErrorKind::ModelNotFound
                    && self.fallback_model != self.model =>
            {
                warn!(
                    provider = PROVIDER_NAME,
                    model = %self.model,
                    fallback = %self.fallback_model,
                    "Model not found, retrying with fallback model"
                );
                self.call_model(api_key, &self.fallback_model, prompt, options)
                    .await
            }
            other => other,
        }
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Concatenated text blocks, in order
    fn text(&self) -> String {
        self.content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}
