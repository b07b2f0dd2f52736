//! Mutable execution state threaded through a chain run

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State owned exclusively by one chain run
///
/// Steps read and write `variables` and `outputs` through a mutable borrow
/// threaded by the executor; the context is never shared across concurrent
/// runs. Once the error flag is set it cannot be cleared within the same run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainContext {
    execution_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    variables: HashMap<String, serde_json::Value>,
    outputs: HashMap<String, serde_json::Value>,
    has_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
}

impl ChainContext {
    /// Create an empty context with a generated execution id
    pub fn new() -> Self {
        Self::from_variables(HashMap::new())
    }

    /// Create a context seeded with initial variables
    pub fn from_variables(variables: HashMap<String, serde_json::Value>) -> Self {
        Self {
            execution_id: Uuid::new_v4().to_string(),
            session_id: None,
            variables,
            outputs: HashMap::new(),
            has_error: false,
            error_message: None,
        }
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn set_session_id(&mut self, session_id: impl Into<String>) {
        self.session_id = Some(session_id.into());
    }

    pub fn variables(&self) -> &HashMap<String, serde_json::Value> {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&serde_json::Value> {
        self.variables.get(name)
    }

    /// Variable rendered as plain text
    pub fn variable_str(&self, name: &str) -> Option<String> {
        self.variables.get(name).map(value_to_string)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: serde_json::Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn outputs(&self) -> &HashMap<String, serde_json::Value> {
        &self.outputs
    }

    pub fn output(&self, name: &str) -> Option<&serde_json::Value> {
        self.outputs.get(name)
    }

    pub fn set_output(&mut self, name: impl Into<String>, value: serde_json::Value) {
        self.outputs.insert(name.into(), value);
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Mark the run as failed
    ///
    /// The first error is terminal: later calls are ignored so a failing run
    /// cannot be masked by subsequent steps.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.has_error {
            let message = message.into();
            tracing::debug!(
                execution_id = %self.execution_id,
                ignored = %message,
                "context already failed, keeping first error"
            );
            return;
        }
        self.has_error = true;
        self.error_message = Some(message.into());
    }
}

impl Default for ChainContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a JSON value as plain text for prompt interpolation
pub(crate) fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        // Arrays and objects keep their JSON representation
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_from_variables() {
        let mut variables = HashMap::new();
        variables.insert("input".to_string(), json!("What is Rust?"));

        let context = ChainContext::from_variables(variables);

        assert!(!context.execution_id().is_empty());
        assert_eq!(context.variable("input"), Some(&json!("What is Rust?")));
        assert!(context.outputs().is_empty());
        assert!(!context.has_error());
    }

    #[test]
    fn test_variable_str_renders_scalars() {
        let mut context = ChainContext::new();
        context.set_variable("text", json!("hello"));
        context.set_variable("count", json!(42));
        context.set_variable("flag", json!(true));
        context.set_variable("list", json!([1, 2]));

        assert_eq!(context.variable_str("text").as_deref(), Some("hello"));
        assert_eq!(context.variable_str("count").as_deref(), Some("42"));
        assert_eq!(context.variable_str("flag").as_deref(), Some("true"));
        assert_eq!(context.variable_str("list").as_deref(), Some("[1,2]"));
        assert_eq!(context.variable_str("missing"), None);
    }

    #[test]
    fn test_first_error_is_terminal() {
        let mut context = ChainContext::new();

        context.fail("first failure");
        context.fail("second failure");

        assert!(context.has_error());
        assert_eq!(context.error_message(), Some("first failure"));
    }

    #[test]
    fn test_outputs_accumulate() {
        let mut context = ChainContext::new();
        context.set_output("a", json!("x"));
        context.set_output("output", json!("final"));

        assert_eq!(context.output("a"), Some(&json!("x")));
        assert_eq!(context.output("output"), Some(&json!("final")));
        assert_eq!(context.outputs().len(), 2);
    }
}
