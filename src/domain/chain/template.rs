//! Prompt template rendering
//!
//! Templates reference chain variables as `${var:name}` with an optional
//! default: `${var:name:default}`. A referenced variable with no value and no
//! default fails resolution.

use once_cell::sync::Lazy;
use regex::Regex;

use super::context::{value_to_string, ChainContext};
use super::error::ChainError;

/// Regex for variable references: ${var:name} or ${var:name:default}
static VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{var:([a-zA-Z0-9_.-]+)(?::([^}]*))?\}").unwrap());

/// A prompt template over chain variables
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Check if a string contains any variable references
    pub fn has_variables(template: &str) -> bool {
        VAR_PATTERN.is_match(template)
    }

    /// Names of all referenced variables, in order of appearance
    pub fn variable_names(&self) -> Vec<String> {
        VAR_PATTERN
            .captures_iter(&self.template)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    /// Substitute every variable reference from the context
    pub fn render(&self, context: &ChainContext) -> Result<String, ChainError> {
        let mut rendered = self.template.clone();

        for caps in VAR_PATTERN.captures_iter(&self.template) {
            let full_match = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            let name = &caps[1];
            let default = caps.get(2).map(|m| m.as_str());

            let value = match context.variable(name) {
                Some(value) if !value.is_null() => value_to_string(value),
                _ => match default {
                    Some(default) => default.to_string(),
                    None => {
                        return Err(ChainError::variable_resolution(format!(
                            "Required variable '{name}' not found"
                        )))
                    }
                },
            };

            rendered = rendered.replace(full_match, &value);
        }

        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn context_with(pairs: &[(&str, serde_json::Value)]) -> ChainContext {
        let variables: HashMap<String, serde_json::Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        ChainContext::from_variables(variables)
    }

    #[test]
    fn test_render_simple() {
        let context = context_with(&[("name", json!("Alice"))]);
        let template = PromptTemplate::new("Hello, ${var:name}!");

        assert_eq!(template.render(&context).unwrap(), "Hello, Alice!");
    }

    #[test]
    fn test_render_multiple_variables() {
        let context = context_with(&[("question", json!("Why?")), ("context", json!("Because."))]);
        let template = PromptTemplate::new("Context: ${var:context}\n\nQuestion: ${var:question}");

        assert_eq!(
            template.render(&context).unwrap(),
            "Context: Because.\n\nQuestion: Why?"
        );
    }

    #[test]
    fn test_render_with_default() {
        let context = context_with(&[]);
        let template = PromptTemplate::new("Language: ${var:language:English}");

        assert_eq!(template.render(&context).unwrap(), "Language: English");
    }

    #[test]
    fn test_render_missing_required_fails() {
        let context = context_with(&[]);
        let template = PromptTemplate::new("${var:missing}");

        let error = template.render(&context).unwrap_err();
        assert!(error.to_string().contains("missing"));
    }

    #[test]
    fn test_render_non_string_values() {
        let context = context_with(&[("count", json!(3)), ("items", json!(["a", "b"]))]);
        let template = PromptTemplate::new("Count: ${var:count}, items: ${var:items}");

        assert_eq!(
            template.render(&context).unwrap(),
            "Count: 3, items: [\"a\",\"b\"]"
        );
    }

    #[test]
    fn test_no_variables_passes_through() {
        let context = context_with(&[]);
        let template = PromptTemplate::new("No variables here");

        assert_eq!(template.render(&context).unwrap(), "No variables here");
        assert!(!PromptTemplate::has_variables("No variables here"));
    }

    #[test]
    fn test_variable_names() {
        let template = PromptTemplate::new("${var:a} and ${var:b:fallback}");
        assert_eq!(template.variable_names(), vec!["a", "b"]);
    }
}
