//! Engine configuration
//!
//! All configuration, credentials included, is supplied by the calling layer;
//! the engine never reads the environment or disk itself.

use serde::Deserialize;

/// Top-level configuration for the engine
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub provider: Option<ProviderConfig>,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Supported provider backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAi,
    Anthropic,
}

/// Provider gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub provider_type: ProviderType,
    pub api_key: String,
    /// Override for self-hosted or proxied endpoints
    #[serde(default)]
    pub base_url: Option<String>,
    /// Model used when a step does not name one
    #[serde(default)]
    pub default_model: Option<String>,
    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl ProviderConfig {
    pub fn new(provider_type: ProviderType, api_key: impl Into<String>) -> Self {
        Self {
            provider_type,
            api_key: api_key.into(),
            base_url: None,
            default_model: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Defaults for retrieval-augmented steps
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Number of documents to retrieve
    pub top_k: usize,
    /// Separator between retrieved contents in the assembled context
    pub separator: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            separator: "\n\n---\n\n".to_string(),
        }
    }
}

/// Conversational memory behavior
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Recent entries included in the context window
    pub window_size: usize,
    /// Estimated token usage that triggers summary regeneration
    pub summary_threshold_tokens: usize,
    /// Model used for summaries; provider default when unset
    #[serde(default)]
    pub summary_model: Option<String>,
    /// Whether system entries appear in the context window
    #[serde(default)]
    pub include_system_entries: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            summary_threshold_tokens: 2000,
            summary_model: None,
            include_system_entries: false,
        }
    }
}

impl MemoryConfig {
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_summary_threshold_tokens(mut self, threshold: usize) -> Self {
        self.summary_threshold_tokens = threshold;
        self
    }

    pub fn with_summary_model(mut self, model: impl Into<String>) -> Self {
        self.summary_model = Some(model.into());
        self
    }

    pub fn with_include_system_entries(mut self, include: bool) -> Self {
        self.include_system_entries = include;
        self
    }
}

/// Chain executor behavior
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// Per-run timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 120,
        }
    }
}

impl ChainConfig {
    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();

        assert!(config.provider.is_none());
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.memory.window_size, 10);
        assert_eq!(config.memory.summary_threshold_tokens, 2000);
        assert_eq!(config.chain.timeout_seconds, 120);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_deserialize_from_json() {
        let config: EngineConfig = serde_json::from_str(
            r#"{
                "provider": {
                    "provider_type": "openai",
                    "api_key": "sk-test",
                    "default_model": "gpt-4o"
                },
                "chain": {"timeout_seconds": 60}
            }"#,
        )
        .unwrap();

        let provider = config.provider.unwrap();
        assert_eq!(provider.provider_type, ProviderType::OpenAi);
        assert_eq!(provider.timeout_secs, 30);
        assert_eq!(provider.default_model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.chain.timeout_seconds, 60);
    }

    #[test]
    fn test_provider_config_builder() {
        let config = ProviderConfig::new(ProviderType::Anthropic, "sk-ant")
            .with_base_url("https://proxy.internal")
            .with_timeout_secs(10);

        assert_eq!(config.base_url.as_deref(), Some("https://proxy.internal"));
        assert_eq!(config.timeout_secs, 10);
    }
}
