//! Document entity used for indexing and retrieval

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Conventional metadata key holding the document origin
pub const SOURCE_KEY: &str = "source";

/// A unit of content stored in a vector store
///
/// Documents are created by loaders or by the indexing caller. The embedding
/// is assigned at index time; the score is populated only on documents
/// returned from a search and is never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier, generated when not supplied
    pub id: String,
    /// Text payload
    pub content: String,
    /// Metadata key-value pairs used for filtering; empty by default
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Embedding vector, present once the document has been indexed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Similarity score, present only on search results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Document {
    /// Create a new document with a generated id
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            metadata: HashMap::new(),
            embedding: None,
            score: None,
        }
    }

    /// Create with a specific id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set a metadata key, overwriting any prior value for that key
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Replace all metadata
    pub fn with_all_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set the embedding vector
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Attach a similarity score; used by search paths only
    pub(crate) fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    /// Get the conventional source metadata value
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).and_then(|v| v.as_str())
    }

    /// Set the conventional source metadata value
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.metadata
            .insert(SOURCE_KEY.to_string(), serde_json::Value::String(source.into()));
    }

    /// Builder variant of [`set_source`](Self::set_source)
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.set_source(source);
        self
    }

    /// Estimated token count of this document's content
    pub fn estimated_tokens(&self) -> usize {
        estimate_token_count(&self.content)
    }
}

/// Cheap length-based token estimate for context-window budgeting
///
/// One token per four characters, with a minimum of one token for non-empty
/// content. Not a real tokenizer.
pub fn estimate_token_count(content: &str) -> usize {
    if content.is_empty() {
        return 0;
    }
    (content.chars().count() / 4).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_document_generates_id() {
        let a = Document::new("first");
        let b = Document::new("second");

        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert!(a.metadata.is_empty());
        assert!(a.embedding.is_none());
        assert!(a.score.is_none());
    }

    #[test]
    fn test_with_metadata_overwrites() {
        let doc = Document::new("content")
            .with_metadata("category", json!("docs"))
            .with_metadata("category", json!("faq"));

        assert_eq!(doc.metadata.get("category"), Some(&json!("faq")));
    }

    #[test]
    fn test_source_helpers() {
        let doc = Document::new("content").with_source("wiki");
        assert_eq!(doc.source(), Some("wiki"));

        let mut doc = Document::new("content");
        assert_eq!(doc.source(), None);
        doc.set_source("manual");
        assert_eq!(doc.source(), Some("manual"));
        assert_eq!(doc.metadata.get(SOURCE_KEY), Some(&json!("manual")));
    }

    #[test]
    fn test_estimate_token_count_empty() {
        assert_eq!(estimate_token_count(""), 0);
    }

    #[test]
    fn test_estimate_token_count_minimum_one() {
        assert_eq!(estimate_token_count("a"), 1);
        assert_eq!(estimate_token_count("abc"), 1);
    }

    #[test]
    fn test_estimate_token_count_length_based() {
        assert_eq!(estimate_token_count("abcd"), 1);
        assert_eq!(estimate_token_count("abcdefgh"), 2);
        assert_eq!(estimate_token_count(&"x".repeat(40)), 10);
    }

    #[test]
    fn test_serialization_skips_absent_fields() {
        let doc = Document::new("hello").with_id("doc-1");
        let json = serde_json::to_string(&doc).unwrap();

        assert!(json.contains("\"id\":\"doc-1\""));
        assert!(!json.contains("embedding"));
        assert!(!json.contains("score"));
    }
}
