//! OpenAI API Provider
//!
//! Primary adapter using OpenAI's Chat Completions API in JSON mode.
//! The reply's `choices[0].message.content` is decoded into a
//! [`ProviderReply`].

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use super::{
    AnalysisPrompt, GenerationOptions, LlmProvider, ProviderConfig, ProviderReply, ProviderResult,
    build_http_client, error_from_response,
};
use crate::constants::provider::openai as defaults;
use crate::types::{ProviderError, ProviderErrorClassifier, ProviderErrorKind, Result};

const PROVIDER_NAME: &str = "openai";

/// OpenAI API Provider with secure API key handling
pub struct OpenAiProvider {
    /// `None` when no credential was found; every call then fails fast
    api_key: Option<SecretString>,
    api_base: String,
    model: String,
    fallback_model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("fallback_model", &self.fallback_model)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = config.resolve_api_key(defaults::API_KEY_ENV);
        if api_key.is_none() {
            debug!("OpenAI provider built without credential");
        }

        Ok(Self {
            api_key,
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
    ) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompt.system.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.user.clone(),
                },
            ],
            temperature: options.temperature,
            max_tokens: Some(options.max_tokens),
            response_format: options.json_mode.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }

    async fn call_model(
        &self,
        api_key: &SecretString,
        model: &str,
        prompt: &AnalysisPrompt,
        options: &GenerationOptions,
    ) -> ProviderResult<ProviderReply> {
        let start_time = Instant::now();
        let request = self.build_request(model, prompt, options);
        let url = format!("{}/chat/completions", self.api_base);

        debug!(model, "Sending request to OpenAI API");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderErrorClassifier::classify_transport(&e, PROVIDER_NAME))?;

        if !response.status().is_success() {
            return Err(error_from_response(response, PROVIDER_NAME).await);
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            ProviderError::with_provider(
                ProviderErrorKind::Unknown,
                format!("Failed to parse OpenAI response: {}", e),
                PROVIDER_NAME,
            )
        })?;

        debug!(
            model,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Received response from OpenAI"
        );

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::with_provider(
                    ProviderErrorKind::Unknown,
                    "No content in OpenAI response",
                    PROVIDER_NAME,
                )
            })?;

        Ok(decode_content(content, options.json_mode))
    }
}

/// JSON mode promises a bare object; anything else is treated as text.
fn decode_content(content: String, json_mode: bool) -> ProviderReply {
    if json_mode {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&content) {
            if value.is_object() {
                return ProviderReply::Structured {
                    raw: content,
                    value,
                };
            }
        }
    }
    ProviderReply::from_text(content)
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(
        &self,
        prompt: &AnalysisPrompt,
        options: &GenerationOptions,
    ) -> ProviderResult<ProviderReply> {
        let Some(api_key) = &self.api_key else {
            return Err(ProviderError::not_configured(PROVIDER_NAME));
        };

        match self.call_model(api_key, &self.model, prompt, options).await {
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

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn offline() -> OpenAiProvider {
        OpenAiProvider::new(&ProviderConfig::openai().disabled()).unwrap()
    }

    #[tokio::test]
    async fn test_unconfigured_fails_fast() {
        let provider = OpenAiProvider::new(&ProviderConfig {
            api_base: Some("http://127.0.0.1:9".into()),
            ..ProviderConfig::openai().disabled()
        })
        .unwrap();

        let started = Instant::now();
        let err = provider
            .generate(&AnalysisPrompt::new("s", "u"), &GenerationOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind, ProviderErrorKind::Unauthenticated);
        assert_eq!(err.provider.as_deref(), Some("openai"));
        assert!(started.elapsed().as_millis() < 100);
    }

    #[test]
    fn test_default_models() {
        let provider = offline();
        assert_eq!(provider.model(), "gpt-4o");
        assert_eq!(provider.fallback_model, "gpt-4o-mini");
        assert!(!provider.is_configured());
    }

    #[test]
    fn test_request_json_mode_toggle() {
        let provider = offline();
        let prompt = AnalysisPrompt::new("sys", "user");

        let req = provider.build_request("gpt-4o", &prompt, &GenerationOptions::default());
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "user");

        let text_opts = GenerationOptions {
            json_mode: false,
            ..Default::default()
        };
        let req = provider.build_request("gpt-4o", &prompt, &text_opts);
        let body = serde_json::to_value(&req).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_decode_content() {
        let reply = decode_content("{\"a\":1}".to_string(), true);
        assert_eq!(reply.parsed(), Some(&json!({"a": 1})));

        let reply = decode_content("[1,2]".to_string(), true);
        assert!(reply.parsed().is_none());

        let reply = decode_content("text then {\"b\":2}".to_string(), false);
        assert_eq!(reply.parsed(), Some(&json!({"b": 2})));
    }

    async fn against(server: &mockito::ServerGuard) -> OpenAiProvider {
        OpenAiProvider::new(&ProviderConfig {
            api_key: Some("sk-test".into()),
            api_base: Some(server.url()),
            ..ProviderConfig::openai()
        })
        .unwrap()
    }

    fn completion(content: &str) -> String {
        json!({"choices": [{"message": {"content": content}}]}).to_string()
    }

    #[tokio::test]
    async fn test_missing_model_retries_fallback_once() {
        let mut server = mockito::Server::new_async().await;
        let missing = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(json!({"model": "gpt-4o"})))
            .with_status(404)
            .with_body(r#"{"error":{"code":"model_not_found","message":"The model `gpt-4o` does not exist"}}"#)
            .expect(1)
            .create_async()
            .await;
        let fallback = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({"model": "gpt-4o-mini"})))
            .with_status(200)
            .with_body(completion("{\"script_title\": \"Bail Hearing\"}"))
            .expect(1)
            .create_async()
            .await;

        let reply = against(&server)
            .await
            .generate(&AnalysisPrompt::new("s", "u"), &GenerationOptions::default())
            .await
            .unwrap();

        missing.assert_async().await;
        fallback.assert_async().await;
        assert_eq!(reply.parsed(), Some(&json!({"script_title": "Bail Hearing"})));
    }

    #[tokio::test]
    async fn test_fallback_model_not_retried_twice() {
        let mut server = mockito::Server::new_async().await;
        let missing = server
            .mock("POST", "/chat/completions")
            .with_status(404)
            .with_body(r#"{"error":{"code":"model_not_found"}}"#)
            .expect(2)
            .create_async()
            .await;

        let err = against(&server)
            .await
            .generate(&AnalysisPrompt::new("s", "u"), &GenerationOptions::default())
            .await
            .unwrap_err();

        missing.assert_async().await;
        assert_eq!(err.kind, ProviderErrorKind::ModelNotFound);
    }

    #[tokio::test]
    async fn test_http_status_mapping() {
        let mut server = mockito::Server::new_async().await;
        let provider = against(&server).await;
        let prompt = AnalysisPrompt::new("s", "u");
        let options = GenerationOptions::default();

        let revoked = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"code":"invalid_api_key"}}"#)
            .create_async()
            .await;
        let err = provider.generate(&prompt, &options).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Unauthenticated);
        assert!(!err.kind.trips_breaker());
        revoked.remove_async().await;

        let limited = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_header("retry-after", "7")
            .with_body("slow down")
            .create_async()
            .await;
        let err = provider.generate(&prompt, &options).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::RateLimited);
        assert_eq!(err.retry_after, Some(std::time::Duration::from_secs(7)));
        limited.remove_async().await;

        let outage = server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;
        let err = provider.generate(&prompt, &options).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Unknown);
        assert!(err.message.contains("503"));
        outage.remove_async().await;

        let empty = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("")
            .create_async()
            .await;
        let err = provider.generate(&prompt, &options).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Unknown);
        empty.remove_async().await;

        let _blank = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(completion("   "))
            .create_async()
            .await;
        let err = provider.generate(&prompt, &options).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Unknown);
    }

    #[test]
    fn test_response_parsing() {
        let body: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": "{\"x\": true}"}}],
            "usage": {"prompt_tokens": 1, "completion_tokens": 2}
        }))
        .unwrap();
        assert_eq!(
            body.choices[0].message.content.as_deref(),
            Some("{\"x\": true}")
        );
    }
}
