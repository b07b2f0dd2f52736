//! Memory manager - context assembly and summarization over a memory store

use std::sync::Arc;

use crate::config::MemoryConfig;
use crate::domain::provider::{AiProvider, CompletionRequest};

use super::{MemoryEntry, MemoryError, MemoryRole, MemoryStore};

const SUMMARY_PROMPT: &str = "Summarize the following conversation into concise key points, \
preserving important information and context:\n\n";

/// Coordinates a [`MemoryStore`] with the provider gateway
///
/// Appends conversation turns, assembles the context window (rolling summary
/// plus recent entries), and regenerates the summary once a session's
/// estimated token usage crosses the configured threshold.
#[derive(Debug)]
pub struct MemoryManager {
    store: Arc<dyn MemoryStore>,
    provider: Arc<dyn AiProvider>,
    config: MemoryConfig,
}

impl MemoryManager {
    pub fn new(store: Arc<dyn MemoryStore>, provider: Arc<dyn AiProvider>) -> Self {
        Self {
            store,
            provider,
            config: MemoryConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MemoryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Append a user turn; may trigger summary regeneration
    pub async fn add_user_message(
        &self,
        session_id: &str,
        content: impl Into<String>,
    ) -> Result<MemoryEntry, MemoryError> {
        let entry = MemoryEntry::user(content);
        self.store.store(session_id, entry.clone()).await?;
        self.check_summary_threshold(session_id).await?;
        Ok(entry)
    }

    /// Append an assistant turn
    pub async fn add_assistant_message(
        &self,
        session_id: &str,
        content: impl Into<String>,
    ) -> Result<MemoryEntry, MemoryError> {
        let entry = MemoryEntry::assistant(content);
        self.store.store(session_id, entry.clone()).await?;
        Ok(entry)
    }

    /// Append a system turn
    pub async fn add_system_message(
        &self,
        session_id: &str,
        content: impl Into<String>,
    ) -> Result<MemoryEntry, MemoryError> {
        let entry = MemoryEntry::system(content);
        self.store.store(session_id, entry.clone()).await?;
        Ok(entry)
    }

    /// Context window for the next prompt: the rolling summary (when present)
    /// as a leading system entry, followed by the most recent entries
    pub async fn context_messages(&self, session_id: &str) -> Result<Vec<MemoryEntry>, MemoryError> {
        let mut context = Vec::new();

        if let Some(summary) = self.store.get_summary(session_id).await? {
            if !summary.is_empty() {
                context.push(MemoryEntry::system(format!(
                    "Summary of the conversation so far:\n{summary}"
                )));
            }
        }

        let mut recent = self.store.get_history(session_id, self.config.window_size).await?;
        if !self.config.include_system_entries {
            recent.retain(|entry| entry.role != MemoryRole::System);
        }

        context.extend(recent);
        Ok(context)
    }

    /// Render entries as a plain-text transcript
    pub fn format_as_prompt(&self, entries: &[MemoryEntry]) -> String {
        let mut prompt = String::new();

        for entry in entries {
            prompt.push_str(entry.role.label());
            prompt.push_str(": ");
            prompt.push_str(&entry.content);
            prompt.push_str("\n\n");
        }

        prompt.trim_end().to_string()
    }

    /// Condense the full session history into the summary slot
    ///
    /// Provider failures are logged and swallowed: the history stays intact
    /// and the previous summary (if any) keeps serving.
    pub async fn generate_summary(&self, session_id: &str) -> Result<Option<String>, MemoryError> {
        let count = self.store.entry_count(session_id).await?;
        if count == 0 {
            return Ok(None);
        }

        let entries = self.store.get_history(session_id, count).await?;
        let transcript = entries
            .iter()
            .map(|e| format!("{}: {}", e.role, e.content))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!("{SUMMARY_PROMPT}{transcript}");
        let model = self
            .config
            .summary_model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string());

        match self.provider.complete(&model, CompletionRequest::new(prompt)).await {
            Ok(response) => {
                self.store.save_summary(session_id, &response.content).await?;
                tracing::info!(session_id, "generated conversation summary");
                Ok(Some(response.content))
            }
            Err(error) => {
                tracing::error!(session_id, error = %error, "failed to generate summary");
                Ok(None)
            }
        }
    }

    /// Remove the session's entries and summary
    pub async fn clear(&self, session_id: &str) -> Result<(), MemoryError> {
        self.store.clear(session_id).await?;
        tracing::info!(session_id, "cleared session memory");
        Ok(())
    }

    /// Current summary, if one has been generated
    pub async fn summary(&self, session_id: &str) -> Result<Option<String>, MemoryError> {
        self.store.get_summary(session_id).await
    }

    /// Estimated token usage across the session
    pub async fn token_usage(&self, session_id: &str) -> Result<usize, MemoryError> {
        self.store.token_count(session_id).await
    }

    async fn check_summary_threshold(&self, session_id: &str) -> Result<(), MemoryError> {
        let tokens = self.store.token_count(session_id).await?;
        if tokens > self.config.summary_threshold_tokens {
            tracing::info!(
                session_id,
                tokens,
                threshold = self.config.summary_threshold_tokens,
                "token threshold exceeded, regenerating summary"
            );
            self.generate_summary(session_id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::mock::MockAiProvider;
    use crate::infrastructure::memory::InMemoryMemoryStore;

    fn manager_with(provider: MockAiProvider, config: MemoryConfig) -> MemoryManager {
        MemoryManager::new(Arc::new(InMemoryMemoryStore::new()), Arc::new(provider))
            .with_config(config)
    }

    #[tokio::test]
    async fn test_context_messages_window() {
        let manager = manager_with(
            MockAiProvider::new().with_response("unused"),
            MemoryConfig::default().with_window_size(2),
        );

        manager.add_user_message("s1", "first").await.unwrap();
        manager.add_assistant_message("s1", "second").await.unwrap();
        manager.add_user_message("s1", "third").await.unwrap();

        let context = manager.context_messages("s1").await.unwrap();

        assert_eq!(context.len(), 2);
        assert_eq!(context[0].content, "second");
        assert_eq!(context[1].content, "third");
    }

    #[tokio::test]
    async fn test_context_messages_include_summary() {
        let manager = manager_with(MockAiProvider::new().with_response("a summary"), MemoryConfig::default());

        manager.add_user_message("s1", "hello").await.unwrap();
        manager.generate_summary("s1").await.unwrap();

        let context = manager.context_messages("s1").await.unwrap();

        assert_eq!(context[0].role, MemoryRole::System);
        assert!(context[0].content.contains("a summary"));
        assert_eq!(context.last().unwrap().content, "hello");
    }

    #[tokio::test]
    async fn test_system_entries_filtered_from_window() {
        let manager = manager_with(MockAiProvider::new().with_response("unused"), MemoryConfig::default());

        manager.add_system_message("s1", "be helpful").await.unwrap();
        manager.add_user_message("s1", "hi").await.unwrap();

        let context = manager.context_messages("s1").await.unwrap();

        assert_eq!(context.len(), 1);
        assert_eq!(context[0].content, "hi");
    }

    #[tokio::test]
    async fn test_summary_triggered_by_token_threshold() {
        let manager = manager_with(
            MockAiProvider::new().with_response("condensed"),
            MemoryConfig::default().with_summary_threshold_tokens(10),
        );

        // Well past the 10-token threshold
        manager
            .add_user_message("s1", "x".repeat(100))
            .await
            .unwrap();

        assert_eq!(manager.summary("s1").await.unwrap().as_deref(), Some("condensed"));
    }

    #[tokio::test]
    async fn test_summary_failure_is_not_fatal() {
        let manager = manager_with(
            MockAiProvider::new()
                .push_error(crate::domain::provider::ProviderError::connection("down")),
            MemoryConfig::default(),
        );

        manager.add_user_message("s1", "hello").await.unwrap();
        let summary = manager.generate_summary("s1").await.unwrap();

        assert!(summary.is_none());
        assert!(manager.summary("s1").await.unwrap().is_none());

        // History untouched
        let context = manager.context_messages("s1").await.unwrap();
        assert_eq!(context.len(), 1);
    }

    #[tokio::test]
    async fn test_format_as_prompt() {
        let manager = manager_with(MockAiProvider::new().with_response("unused"), MemoryConfig::default());

        let entries = vec![MemoryEntry::user("hi"), MemoryEntry::assistant("hello")];
        let prompt = manager.format_as_prompt(&entries);

        assert_eq!(prompt, "User: hi\n\nAssistant: hello");
    }
}
