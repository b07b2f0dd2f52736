//! Per-session conversational memory
//!
//! A memory store keeps an ordered log of conversation turns per session plus
//! an optional rolling summary used to bound prompt size. Session identifiers
//! are opaque strings supplied by the calling layer.

mod manager;

pub use manager::MemoryManager;

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::document::estimate_token_count;

/// Errors raised by memory store backends
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Memory store error: {message}")]
    Backend { message: String },
}

impl MemoryError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryRole {
    User,
    Assistant,
    System,
}

impl MemoryRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }

    /// Display label used when formatting history as a prompt
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
            Self::System => "System",
        }
    }
}

impl std::fmt::Display for MemoryRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single conversation turn
///
/// Entries are append-only: they are never mutated after storage and are
/// removed only by clearing the whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: String,
    pub role: MemoryRole,
    pub content: String,
    /// Metadata key-value pairs; empty by default, never absent
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Wall-clock timestamp in milliseconds
    pub timestamp_ms: i64,
}

impl MemoryEntry {
    pub fn new(role: MemoryRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            metadata: HashMap::new(),
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MemoryRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MemoryRole::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MemoryRole::System, content)
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_timestamp_ms(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    /// Estimated token count of this entry's content
    pub fn estimated_tokens(&self) -> usize {
        estimate_token_count(&self.content)
    }
}

/// Capability trait for per-session memory backends
///
/// Operations for different sessions are safe to run concurrently; appends
/// within one session are serialized by the backend so ordering cannot be
/// corrupted. A completed `store` is visible to every subsequent
/// `get_history` on the same backing medium.
#[async_trait]
pub trait MemoryStore: Send + Sync + Debug {
    /// Append an entry to a session's log
    async fn store(&self, session_id: &str, entry: MemoryEntry) -> Result<(), MemoryError>;

    /// Most recent `limit` entries in chronological (ascending timestamp)
    /// order; fewer when the history is shorter, empty for unknown sessions
    async fn get_history(&self, session_id: &str, limit: usize)
        -> Result<Vec<MemoryEntry>, MemoryError>;

    /// Remove all entries and the summary for a session; idempotent
    async fn clear(&self, session_id: &str) -> Result<(), MemoryError>;

    /// Best-effort relevance search over one session's entries
    ///
    /// Backends without semantic capability may fall back to substring or
    /// recency matching; only session-scoping and the `limit` bound are
    /// guaranteed.
    async fn search(
        &self,
        session_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryEntry>, MemoryError>;

    /// Condensed representation of the session history, absent by default
    async fn get_summary(&self, session_id: &str) -> Result<Option<String>, MemoryError>;

    /// Replace the session's summary slot
    async fn save_summary(&self, session_id: &str, summary: &str) -> Result<(), MemoryError>;

    /// Number of entries in a session
    async fn entry_count(&self, session_id: &str) -> Result<usize, MemoryError>;

    /// Estimated token total across a session's entries
    async fn token_count(&self, session_id: &str) -> Result<usize, MemoryError>;
}
