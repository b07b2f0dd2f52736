//! Embedding provider trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::provider::ProviderError;

/// Capability trait for embedding backends
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate one embedding vector per input text, in input order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;

    /// Embed a single text
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let mut vectors = self.embed(std::slice::from_ref(&text.to_string())).await?;
        vectors
            .pop()
            .ok_or_else(|| ProviderError::connection("embedding backend returned no vectors"))
    }

    /// Provider type name
    fn provider_name(&self) -> &'static str;

    /// Fixed length of the vectors this provider produces
    fn dimensions(&self) -> usize;
}
