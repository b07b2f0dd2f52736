//! In-memory memory store for development and testing
//!
//! Nothing is persisted; production deployments should use a durable backend
//! behind the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::memory::{MemoryEntry, MemoryError, MemoryStore};

/// Memory store backed by process memory
///
/// Appends within a session are serialized by the write lock, so history
/// ordering cannot be corrupted by concurrent turns.
#[derive(Debug, Default)]
pub struct InMemoryMemoryStore {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    sessions: HashMap<String, Vec<MemoryEntry>>,
    summaries: HashMap<String, String>,
}

impl InMemoryMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemoryStore for InMemoryMemoryStore {
    async fn store(&self, session_id: &str, entry: MemoryEntry) -> Result<(), MemoryError> {
        let mut state = self.state.write().await;
        state
            .sessions
            .entry(session_id.to_string())
            .or_default()
            .push(entry);

        tracing::debug!(session_id, "appended memory entry");
        Ok(())
    }

    async fn get_history(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<MemoryEntry>, MemoryError> {
        let state = self.state.read().await;

        let entries = match state.sessions.get(session_id) {
            Some(entries) => entries,
            None => return Ok(Vec::new()),
        };

        let start = entries.len().saturating_sub(limit);
        Ok(entries[start..].to_vec())
    }

    async fn clear(&self, session_id: &str) -> Result<(), MemoryError> {
        let mut state = self.state.write().await;
        state.sessions.remove(session_id);
        state.summaries.remove(session_id);

        tracing::debug!(session_id, "cleared session");
        Ok(())
    }

    async fn search(
        &self,
        session_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryEntry>, MemoryError> {
        let state = self.state.read().await;
        let query_lower = query.to_lowercase();

        // Substring fallback in recency order; no ranking promised
        let results = state
            .sessions
            .get(session_id)
            .map(|entries| {
                entries
                    .iter()
                    .rev()
                    .filter(|entry| entry.content.to_lowercase().contains(&query_lower))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(results)
    }

    async fn get_summary(&self, session_id: &str) -> Result<Option<String>, MemoryError> {
        Ok(self.state.read().await.summaries.get(session_id).cloned())
    }

    async fn save_summary(&self, session_id: &str, summary: &str) -> Result<(), MemoryError> {
        let mut state = self.state.write().await;
        state
            .summaries
            .insert(session_id.to_string(), summary.to_string());

        tracing::debug!(session_id, "saved session summary");
        Ok(())
    }

    async fn entry_count(&self, session_id: &str) -> Result<usize, MemoryError> {
        Ok(self
            .state
            .read()
            .await
            .sessions
            .get(session_id)
            .map(|entries| entries.len())
            .unwrap_or(0))
    }

    async fn token_count(&self, session_id: &str) -> Result<usize, MemoryError> {
        Ok(self
            .state
            .read()
            .await
            .sessions
            .get(session_id)
            .map(|entries| entries.iter().map(|e| e.estimated_tokens()).sum())
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(content: &str, timestamp_ms: i64) -> MemoryEntry {
        MemoryEntry::user(content).with_timestamp_ms(timestamp_ms)
    }

    #[tokio::test]
    async fn test_history_preserves_append_order() {
        let store = InMemoryMemoryStore::new();

        for (i, content) in ["one", "two", "three"].iter().enumerate() {
            store.store("s1", entry(content, i as i64)).await.unwrap();
        }

        let history = store.get_history("s1", 10).await.unwrap();

        let contents: Vec<&str> = history.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
        assert!(history.windows(2).all(|w| w[0].timestamp_ms <= w[1].timestamp_ms));
    }

    #[tokio::test]
    async fn test_history_limit_returns_most_recent() {
        let store = InMemoryMemoryStore::new();

        for i in 0..5 {
            store
                .store("s1", entry(&format!("msg-{i}"), i))
                .await
                .unwrap();
        }

        let history = store.get_history("s1", 2).await.unwrap();

        let contents: Vec<&str> = history.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["msg-3", "msg-4"]);
    }

    #[tokio::test]
    async fn test_unknown_session_is_empty_not_error() {
        let store = InMemoryMemoryStore::new();

        assert!(store.get_history("nope", 10).await.unwrap().is_empty());
        assert_eq!(store.entry_count("nope").await.unwrap(), 0);
        assert_eq!(store.token_count("nope").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = InMemoryMemoryStore::new();

        store.store("a", entry("for a", 1)).await.unwrap();
        store.store("b", entry("for b", 1)).await.unwrap();

        let history_a = store.get_history("a", 10).await.unwrap();
        assert_eq!(history_a.len(), 1);
        assert_eq!(history_a[0].content, "for a");

        let found = store.search("a", "for b", 10).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_entries_and_summary() {
        let store = InMemoryMemoryStore::new();

        store.store("s1", entry("hello", 1)).await.unwrap();
        store.save_summary("s1", "a summary").await.unwrap();

        store.clear("s1").await.unwrap();

        assert!(store.get_history("s1", 10).await.unwrap().is_empty());
        assert!(store.get_summary("s1").await.unwrap().is_none());

        // Idempotent
        store.clear("s1").await.unwrap();
    }

    #[tokio::test]
    async fn test_search_is_bounded_and_case_insensitive() {
        let store = InMemoryMemoryStore::new();

        for i in 0..4 {
            store
                .store("s1", entry(&format!("Rust topic {i}"), i))
                .await
                .unwrap();
        }
        store.store("s1", entry("unrelated", 9)).await.unwrap();

        let results = store.search("s1", "rust", 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|e| e.content.contains("Rust")));
    }

    #[tokio::test]
    async fn test_summary_slot_overwrites() {
        let store = InMemoryMemoryStore::new();

        assert!(store.get_summary("s1").await.unwrap().is_none());

        store.save_summary("s1", "first").await.unwrap();
        store.save_summary("s1", "second").await.unwrap();

        assert_eq!(store.get_summary("s1").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_token_count_sums_entries() {
        let store = InMemoryMemoryStore::new();

        store.store("s1", entry(&"x".repeat(8), 1)).await.unwrap(); // 2 tokens
        store.store("s1", entry("hi", 2)).await.unwrap(); // 1 token

        assert_eq!(store.token_count("s1").await.unwrap(), 3);
    }
}
