//! In-memory vector store for development and testing
//!
//! Production deployments should use a dedicated vector database behind the
//! same trait.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::document::Document;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::vector_store::{MetadataFilter, VectorStore, VectorStoreError};

/// Vector store backed by process memory
///
/// Documents are embedded through the configured provider at index time.
/// Ranking is cosine similarity with insertion order as the tie-break, so
/// repeated queries against an unchanged store return identical results.
#[derive(Debug)]
pub struct InMemoryVectorStore {
    embedder: Arc<dyn EmbeddingProvider>,
    state: RwLock<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    documents: Vec<StoredDocument>,
    insert_seq: u64,
}

#[derive(Debug, Clone)]
struct StoredDocument {
    seq: u64,
    document: Document,
}

impl InMemoryVectorStore {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            state: RwLock::new(StoreState::default()),
        }
    }

    async fn search_by_embedding(
        &self,
        query_embedding: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Vec<Document> {
        let state = self.state.read().await;

        // Filter candidates before ranking so top-k never drops a better
        // match outside the filtered set
        let mut scored: Vec<(f32, u64, &StoredDocument)> = state
            .documents
            .iter()
            .filter(|stored| stored.document.embedding.is_some())
            .filter(|stored| {
                filter
                    .map(|f| f.matches(&stored.document.metadata))
                    .unwrap_or(true)
            })
            .map(|stored| {
                let embedding = stored.document.embedding.as_deref().unwrap_or(&[]);
                (cosine_similarity(query_embedding, embedding), stored.seq, stored)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        scored
            .into_iter()
            .take(k)
            .map(|(score, _, stored)| stored.document.clone().with_score(score))
            .collect()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add_documents(
        &self,
        documents: Vec<Document>,
    ) -> Result<Vec<String>, VectorStoreError> {
        // Embed everything up front; a failure here leaves the store
        // untouched (all-or-nothing per call)
        let pending: Vec<String> = documents
            .iter()
            .filter(|doc| doc.embedding.is_none())
            .map(|doc| doc.content.clone())
            .collect();

        let mut embeddings = if pending.is_empty() {
            Vec::new()
        } else {
            self.embedder.embed(&pending).await?
        }
        .into_iter();

        let mut state = self.state.write().await;
        let mut ids = Vec::with_capacity(documents.len());

        for mut document in documents {
            if document.embedding.is_none() {
                document.embedding = embeddings.next();
            }

            ids.push(document.id.clone());
            let seq = state.insert_seq;
            state.insert_seq += 1;
            state.documents.push(StoredDocument { seq, document });
        }

        tracing::debug!(count = ids.len(), "added documents to in-memory vector store");
        Ok(ids)
    }

    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<Document>, VectorStoreError> {
        let query_embedding = self.embedder.embed_one(query).await?;
        Ok(self.search_by_embedding(&query_embedding, k, None).await)
    }

    async fn similarity_search_filtered(
        &self,
        query: &str,
        k: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<Document>, VectorStoreError> {
        let query_embedding = self.embedder.embed_one(query).await?;
        Ok(self
            .search_by_embedding(&query_embedding, k, Some(filter))
            .await)
    }

    async fn similarity_search_by_vector(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<Document>, VectorStoreError> {
        Ok(self.search_by_embedding(embedding, k, None).await)
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<Document>, VectorStoreError> {
        self.similarity_search(query, k).await
    }

    async fn delete(&self, ids: &[String]) -> Result<(), VectorStoreError> {
        let mut state = self.state.write().await;
        let before = state.documents.len();

        state.documents.retain(|stored| !ids.contains(&stored.document.id));

        tracing::debug!(
            deleted = before - state.documents.len(),
            "deleted documents from in-memory vector store"
        );
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), VectorStoreError> {
        let mut state = self.state.write().await;
        let count = state.documents.len();
        state.documents.clear();

        tracing::info!(count, "cleared in-memory vector store");
        Ok(())
    }

    async fn len(&self) -> Result<usize, VectorStoreError> {
        Ok(self.state.read().await.documents.len())
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}

/// Cosine similarity between two vectors; 0 for mismatched or zero-norm input
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}
