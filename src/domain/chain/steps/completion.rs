//! Completion step - renders a prompt template and invokes the provider

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::chain::context::ChainContext;
use crate::domain::chain::error::ChainError;
use crate::domain::chain::step::ChainStep;
use crate::domain::chain::template::PromptTemplate;
use crate::domain::provider::{AiProvider, CompletionRequest};

/// Invokes a model with a prompt rendered from chain variables
///
/// The response text is written both to the named output slot and back into
/// the variables so later steps can reference it.
#[derive(Debug)]
pub struct CompletionStep {
    name: String,
    provider: Arc<dyn AiProvider>,
    template: PromptTemplate,
    model: Option<String>,
    output_key: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    fault_tolerant: bool,
}

impl CompletionStep {
    pub fn new(
        name: impl Into<String>,
        provider: Arc<dyn AiProvider>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            template: PromptTemplate::new(template),
            model: None,
            output_key: "output".to_string(),
            temperature: None,
            max_tokens: None,
            fault_tolerant: false,
        }
    }

    /// Use a specific model instead of the provider default
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Write the response to a slot other than `"output"`
    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = key.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Let the chain continue past a failure of this step
    pub fn with_fault_tolerance(mut self) -> Self {
        self.fault_tolerant = true;
        self
    }
}

#[async_trait]
impl ChainStep for CompletionStep {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, context: &mut ChainContext) -> Result<(), ChainError> {
        let prompt = self.template.render(context)?;

        let mut request = CompletionRequest::new(prompt);
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let model = self.model.as_deref().unwrap_or(self.provider.default_model());
        let response = self.provider.complete(model, request).await?;

        tracing::debug!(
            step = %self.name,
            model,
            chars = response.content.len(),
            "completion step produced response"
        );

        let value = serde_json::Value::String(response.content);
        context.set_variable(self.output_key.clone(), value.clone());
        context.set_output(self.output_key.clone(), value);

        Ok(())
    }

    fn fault_tolerant(&self) -> bool {
        self.fault_tolerant
    }
}
