//! Conversation step - multi-turn dialogue backed by session memory

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::domain::chain::context::ChainContext;
use crate::domain::chain::error::ChainError;
use crate::domain::chain::step::ChainStep;
use crate::domain::memory::MemoryManager;
use crate::domain::provider::{AiProvider, CompletionRequest};

const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Give coherent answers grounded in the conversation history.";

/// Runs one turn of a conversation against per-session memory
///
/// Reads the user input variable, assembles a prompt from the session's
/// summary and recent history, invokes the provider, and appends both turns
/// to memory. The session id comes from the context, the `session_id`
/// variable, or is generated for a fresh conversation.
#[derive(Debug)]
pub struct ConversationStep {
    name: String,
    memory: Arc<MemoryManager>,
    provider: Arc<dyn AiProvider>,
    system_prompt: String,
    model: Option<String>,
    input_key: String,
}

impl ConversationStep {
    pub fn new(
        name: impl Into<String>,
        memory: Arc<MemoryManager>,
        provider: Arc<dyn AiProvider>,
    ) -> Self {
        Self {
            name: name.into(),
            memory,
            provider,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            model: None,
            input_key: "input".to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_input_key(mut self, key: impl Into<String>) -> Self {
        self.input_key = key.into();
        self
    }

    fn resolve_session_id(&self, context: &ChainContext) -> String {
        if let Some(session_id) = context.session_id() {
            return session_id.to_string();
        }
        if let Some(session_id) = context.variable_str("session_id") {
            if !session_id.is_empty() {
                return session_id;
            }
        }
        Uuid::new_v4().to_string()
    }
}

#[async_trait]
impl ChainStep for ConversationStep {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, context: &mut ChainContext) -> Result<(), ChainError> {
        let session_id = self.resolve_session_id(context);
        context.set_session_id(&session_id);

        let user_input = context
            .variable_str(&self.input_key)
            .filter(|input| !input.trim().is_empty())
            .ok_or_else(|| ChainError::invalid_input("No input provided"))?;

        // History before this turn; the new user input is appended separately
        let history = self.memory.context_messages(&session_id).await?;

        let mut prompt = String::new();
        prompt.push_str("System: ");
        prompt.push_str(&self.system_prompt);
        prompt.push_str("\n\n");

        if !history.is_empty() {
            prompt.push_str("Conversation history:\n");
            prompt.push_str(&self.memory.format_as_prompt(&history));
            prompt.push_str("\n\n");
        }

        prompt.push_str("User: ");
        prompt.push_str(&user_input);
        prompt.push_str("\n\nAssistant:");

        self.memory.add_user_message(&session_id, &user_input).await?;

        let model = self.model.as_deref().unwrap_or(self.provider.default_model());
        let response = self.provider.complete(model, CompletionRequest::new(prompt)).await?;

        self.memory
            .add_assistant_message(&session_id, &response.content)
            .await?;

        tracing::debug!(step = %self.name, session_id = %session_id, "conversation turn completed");

        context.set_output("output", json!(response.content));
        context.set_output("session_id", json!(session_id));

        Ok(())
    }
}
