//! Retrieval step - augments the context with similar documents

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::chain::context::ChainContext;
use crate::domain::chain::error::ChainError;
use crate::domain::chain::step::ChainStep;
use crate::domain::vector_store::{MetadataFilter, VectorStore};

const DEFAULT_SEPARATOR: &str = "\n\n---\n\n";

/// Searches the vector store for documents similar to a query variable
///
/// Retrieved contents are joined into a single context variable for a
/// downstream completion step; source summaries go into the
/// `source_documents` output for callers that want attribution.
#[derive(Debug)]
pub struct RetrievalStep {
    name: String,
    store: Arc<dyn VectorStore>,
    query_key: String,
    output_key: String,
    top_k: usize,
    filter: Option<MetadataFilter>,
    separator: String,
}

impl RetrievalStep {
    pub fn new(name: impl Into<String>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            name: name.into(),
            store,
            query_key: "input".to_string(),
            output_key: "context".to_string(),
            top_k: 4,
            filter: None,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Read the query from a variable other than `"input"`
    pub fn with_query_key(mut self, key: impl Into<String>) -> Self {
        self.query_key = key.into();
        self
    }

    /// Write the joined context to a variable other than `"context"`
    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = key.into();
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Restrict candidates by metadata before ranking
    pub fn with_filter(mut self, filter: MetadataFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

#[async_trait]
impl ChainStep for RetrievalStep {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, context: &mut ChainContext) -> Result<(), ChainError> {
        let query = context
            .variable_str(&self.query_key)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| {
                ChainError::invalid_input(format!(
                    "retrieval query variable '{}' is missing or empty",
                    self.query_key
                ))
            })?;

        let documents = match &self.filter {
            Some(filter) => {
                self.store
                    .similarity_search_filtered(&query, self.top_k, filter)
                    .await?
            }
            None => self.store.similarity_search(&query, self.top_k).await?,
        };

        tracing::debug!(
            step = %self.name,
            count = documents.len(),
            "retrieved documents for query"
        );

        let joined = documents
            .iter()
            .map(|doc| doc.content.as_str())
            .collect::<Vec<_>>()
            .join(&self.separator);

        let sources: Vec<serde_json::Value> = documents
            .iter()
            .map(|doc| {
                json!({
                    "id": doc.id,
                    "source": doc.source(),
                    "score": doc.score,
                })
            })
            .collect();

        context.set_variable(self.output_key.clone(), json!(joined));
        context.set_output(self.output_key.clone(), json!(joined));
        context.set_output("source_documents", json!(sources));
        context.set_output("document_count", json!(documents.len()));

        Ok(())
    }
}
