//! Anthropic messages API provider

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::provider::{AiProvider, CompletionRequest, CompletionResponse, ProviderError};
use crate::infrastructure::http_client::HttpClientTrait;

const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// The messages API requires max_tokens; used when the request leaves it unset
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Provider for the Anthropic messages API
#[derive(Debug)]
pub struct AnthropicProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl<C: HttpClientTrait> AnthropicProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_ANTHROPIC_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
        }
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn build_request(&self, model: &str, request: &CompletionRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": model,
            "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "messages": [{"role": "user", "content": request.prompt}],
        });

        if let Some(temperature) = request.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }
        if let Some(ref stop) = request.stop {
            body["stop_sequences"] = serde_json::json!(stop);
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<CompletionResponse, ProviderError> {
        let response: AnthropicResponse = serde_json::from_value(json).map_err(|e| {
            ProviderError::connection_with_source("failed to parse Anthropic response", e)
        })?;

        let text = response
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| ProviderError::connection("no text content in Anthropic response"))?;

        let mut completion = CompletionResponse::new(response.model, text);

        if let Some(usage) = response.usage {
            completion = completion.with_usage(usage.input_tokens, usage.output_tokens);
        }

        Ok(completion)
    }
}

#[async_trait]
impl<C: HttpClientTrait> AiProvider for AnthropicProvider<C> {
    async fn complete(
        &self,
        model: &str,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let url = self.messages_url();
        let body = self.build_request(model, &request);
        let headers = vec![
            ("x-api-key", self.api_key.as_str()),
            ("anthropic-version", ANTHROPIC_VERSION),
            ("Content-Type", "application/json"),
        ];

        let response = self.client.post_json(&url, headers, &body).await?;
        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "anthropic"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<AnthropicContentBlock>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use serde_json::json;

    fn messages_response() -> serde_json::Value {
        json!({
            "id": "msg-1",
            "model": "claude-3-5-sonnet-20241022",
            "content": [{"type": "text", "text": "Hi from Claude"}],
            "usage": {"input_tokens": 7, "output_tokens": 4}
        })
    }

    #[tokio::test]
    async fn test_complete_parses_text_block() {
        let client = MockHttpClient::new()
            .with_response("https://api.anthropic.com/v1/messages", messages_response());
        let provider = AnthropicProvider::new(client, "sk-ant-test");

        let response = provider
            .complete("claude-3-5-sonnet-20241022", CompletionRequest::new("Hi"))
            .await
            .unwrap();

        assert_eq!(response.content, "Hi from Claude");
        assert_eq!(response.prompt_tokens, Some(7));
        assert_eq!(response.completion_tokens, Some(4));
    }

    #[tokio::test]
    async fn test_max_tokens_defaulted() {
        let client = MockHttpClient::new()
            .with_response("https://api.anthropic.com/v1/messages", messages_response());
        let provider = AnthropicProvider::new(client, "sk-ant-test");

        provider
            .complete("claude-3-5-sonnet-20241022", CompletionRequest::new("Hi"))
            .await
            .unwrap();

        let requests = provider.client.requests();
        assert_eq!(requests[0]["max_tokens"], json!(DEFAULT_MAX_TOKENS));
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_taxonomy() {
        let client =
            MockHttpClient::new().with_status_error("https://api.anthropic.com/v1/messages", 429);
        let provider = AnthropicProvider::new(client, "sk-ant-test");

        let error = provider
            .complete("claude-3-5-sonnet-20241022", CompletionRequest::new("Hi"))
            .await
            .unwrap_err();

        assert_eq!(error.code(), "rate_limit_exceeded");
    }
}
