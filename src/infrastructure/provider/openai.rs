//! OpenAI-compatible chat completion provider
//!
//! Also covers self-hosted runtimes (Ollama, vLLM, LM Studio) that speak the
//! same wire format behind a custom base URL.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::provider::{AiProvider, CompletionRequest, CompletionResponse, ProviderError};
use crate::infrastructure::http_client::HttpClientTrait;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Provider for the OpenAI chat completions API
#[derive(Debug)]
pub struct OpenAiProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    default_model: String,
}

impl<C: HttpClientTrait> OpenAiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_model: DEFAULT_OPENAI_MODEL.to_string(),
        }
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn build_request(&self, model: &str, request: &CompletionRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": model,
            "messages": [{"role": "user", "content": request.prompt}],
        });

        if let Some(temperature) = request.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if let Some(ref stop) = request.stop {
            body["stop"] = serde_json::json!(stop);
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<CompletionResponse, ProviderError> {
        let response: OpenAiResponse = serde_json::from_value(json).map_err(|e| {
            ProviderError::connection_with_source("failed to parse OpenAI response", e)
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::connection("no choices in OpenAI response"))?;

        let mut completion =
            CompletionResponse::new(response.model, choice.message.content.unwrap_or_default());

        if let Some(usage) = response.usage {
            completion = completion.with_usage(usage.prompt_tokens, usage.completion_tokens);
        }

        Ok(completion)
    }
}

#[async_trait]
impl<C: HttpClientTrait> AiProvider for OpenAiProvider<C> {
    async fn complete(
        &self,
        model: &str,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let url = self.chat_completions_url();
        let body = self.build_request(model, &request);
        let headers = vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ];

        let response = self.client.post_json(&url, headers, &body).await?;
        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
