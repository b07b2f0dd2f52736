//! Provider factory - builds gateway providers from caller-supplied config

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ProviderConfig, ProviderType};
use crate::domain::provider::{AiProvider, ProviderError, RetryConfig, RetryingProvider};
use crate::infrastructure::http_client::HttpClient;

use super::anthropic::AnthropicProvider;
use super::openai::OpenAiProvider;

/// Builds providers from a [`ProviderConfig`]
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider for the configured backend
    pub fn create(config: &ProviderConfig) -> Result<Arc<dyn AiProvider>, ProviderError> {
        let client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))?;

        let provider: Arc<dyn AiProvider> = match config.provider_type {
            ProviderType::OpenAi => {
                let mut provider = match &config.base_url {
                    Some(base_url) => {
                        OpenAiProvider::with_base_url(client, &config.api_key, base_url)
                    }
                    None => OpenAiProvider::new(client, &config.api_key),
                };
                if let Some(model) = &config.default_model {
                    provider = provider.with_default_model(model);
                }
                Arc::new(provider)
            }
            ProviderType::Anthropic => {
                let mut provider = match &config.base_url {
                    Some(base_url) => {
                        AnthropicProvider::with_base_url(client, &config.api_key, base_url)
                    }
                    None => AnthropicProvider::new(client, &config.api_key),
                };
                if let Some(model) = &config.default_model {
                    provider = provider.with_default_model(model);
                }
                Arc::new(provider)
            }
        };

        tracing::info!(
            provider = provider.provider_name(),
            model = provider.default_model(),
            "created AI provider"
        );

        Ok(provider)
    }

    /// Create a provider wrapped with transient-failure retries
    pub fn create_with_retry(
        config: &ProviderConfig,
        retry: RetryConfig,
    ) -> Result<Arc<dyn AiProvider>, ProviderError> {
        let inner = Self::create(config)?;
        Ok(Arc::new(RetryingProvider::new(inner, retry)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_openai_provider() {
        let config = ProviderConfig::new(ProviderType::OpenAi, "sk-test");
        let provider = ProviderFactory::create(&config).unwrap();

        assert_eq!(provider.provider_name(), "openai");
    }

    #[test]
    fn test_creates_anthropic_provider_with_model_override() {
        let config = ProviderConfig::new(ProviderType::Anthropic, "sk-ant")
            .with_default_model("claude-3-haiku-20240307");
        let provider = ProviderFactory::create(&config).unwrap();

        assert_eq!(provider.provider_name(), "anthropic");
        assert_eq!(provider.default_model(), "claude-3-haiku-20240307");
    }

    #[test]
    fn test_retry_wrapper_preserves_identity() {
        let config = ProviderConfig::new(ProviderType::OpenAi, "sk-test");
        let provider =
            ProviderFactory::create_with_retry(&config, RetryConfig::default()).unwrap();

        assert_eq!(provider.provider_name(), "openai");
    }
}
