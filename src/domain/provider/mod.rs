//! Provider gateway - abstracts AI model-serving backends
//!
//! Configuration (provider type, base URL, default model, credentials) is
//! supplied by the calling layer; the engine never reads credentials from the
//! environment or disk itself.

mod error;
mod request;
mod retry;

pub use error::ProviderError;
pub use request::{CompletionRequest, CompletionResponse};
pub use retry::{RetryConfig, RetryingProvider};

use async_trait::async_trait;
use std::fmt::Debug;

/// Capability trait for AI providers (OpenAI, Anthropic, local runtimes, ...)
#[async_trait]
pub trait AiProvider: Send + Sync + Debug {
    /// Invoke a named model with a prompt and parameters, returning text
    async fn complete(
        &self,
        model: &str,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError>;

    /// Provider type name
    fn provider_name(&self) -> &'static str;

    /// Model used when a step does not name one
    fn default_model(&self) -> &str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted provider for tests: pops queued results in order, repeating
    /// the last configured response once the queue is empty
    #[derive(Debug)]
    pub struct MockAiProvider {
        script: Mutex<VecDeque<Result<String, ProviderError>>>,
        fallback: Option<String>,
    }

    impl MockAiProvider {
        pub fn new() -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                fallback: None,
            }
        }

        /// Respond with this content for every otherwise unscripted call
        pub fn with_response(mut self, content: impl Into<String>) -> Self {
            self.fallback = Some(content.into());
            self
        }

        /// Queue a successful response
        pub fn push_response(self, content: impl Into<String>) -> Self {
            self.script.lock().unwrap().push_back(Ok(content.into()));
            self
        }

        /// Queue an error
        pub fn push_error(self, error: ProviderError) -> Self {
            self.script.lock().unwrap().push_back(Err(error));
            self
        }
    }

    impl Default for MockAiProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl AiProvider for MockAiProvider {
        async fn complete(
            &self,
            model: &str,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            if let Some(scripted) = self.script.lock().unwrap().pop_front() {
                return scripted.map(|content| CompletionResponse::new(model, content));
            }

            match &self.fallback {
                Some(content) => Ok(CompletionResponse::new(model, content.clone())),
                None => Err(ProviderError::connection("no mock response configured")),
            }
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }

        fn default_model(&self) -> &str {
            "mock-model"
        }
    }
}
