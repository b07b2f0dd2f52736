//! Vector store capability trait and metadata filtering

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::document::Document;
use super::provider::ProviderError;

/// Errors raised by vector store backends
#[derive(Debug, Error)]
pub enum VectorStoreError {
    /// Embedding the query or documents failed
    #[error(transparent)]
    Embedding(#[from] ProviderError),

    #[error("Vector store error: {message}")]
    Backend { message: String },
}

impl VectorStoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Exact-equality metadata filter
///
/// A document matches when its metadata equals every supplied key/value pair.
/// An empty filter matches all documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataFilter {
    conditions: HashMap<String, serde_json::Value>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require exact equality on a metadata key
    pub fn eq(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.conditions.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Check whether the given metadata satisfies every condition
    pub fn matches(&self, metadata: &HashMap<String, serde_json::Value>) -> bool {
        self.conditions
            .iter()
            .all(|(key, expected)| metadata.get(key) == Some(expected))
    }
}

/// Capability trait for similarity-search backends over [`Document`]s
///
/// Implementations embed unembedded documents at index time and rank search
/// candidates by descending similarity. Metadata filtering is applied to the
/// candidate set before top-k selection, never after, so a low-k query cannot
/// silently drop a better match outside the filtered set. Documents with
/// equal scores are ordered by earliest insertion to keep repeated queries
/// deterministic.
#[async_trait]
pub trait VectorStore: Send + Sync + Debug {
    /// Index documents, embedding them if not already embedded
    ///
    /// All-or-nothing per call: either every document becomes visible or the
    /// call fails and none do. Returns assigned ids in input order.
    async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>, VectorStoreError>;

    /// Return up to `k` documents ranked by descending similarity to `query`
    async fn similarity_search(&self, query: &str, k: usize)
        -> Result<Vec<Document>, VectorStoreError>;

    /// Like [`similarity_search`](Self::similarity_search), restricted to
    /// documents matching the metadata filter
    async fn similarity_search_filtered(
        &self,
        query: &str,
        k: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<Document>, VectorStoreError>;

    /// Rank directly against a query embedding
    async fn similarity_search_by_vector(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<Document>, VectorStoreError>;

    /// Identical ranking to [`similarity_search`](Self::similarity_search),
    /// with the score guaranteed on every returned document
    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<Document>, VectorStoreError>;

    /// Remove documents by id; a subsequent search must not return them
    async fn delete(&self, ids: &[String]) -> Result<(), VectorStoreError>;

    /// Remove every document in the store
    async fn delete_all(&self) -> Result<(), VectorStoreError>;

    /// Number of indexed documents
    async fn len(&self) -> Result<usize, VectorStoreError>;

    async fn is_empty(&self) -> Result<bool, VectorStoreError> {
        Ok(self.len().await? == 0)
    }

    /// Backend name for diagnostics
    fn name(&self) -> &'static str;
}
