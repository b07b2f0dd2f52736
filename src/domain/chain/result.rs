//! Chain result derivation

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::context::{value_to_string, ChainContext};

/// Outcome of a chain run
///
/// Exactly one of the outputs or the error is the primary signal: a failed
/// run never reports a primary `output`, though accumulated outputs are kept
/// for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainResult {
    /// Whether the run completed without error
    pub success: bool,

    /// Primary output text, from the canonical `"output"` slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Full output mapping
    pub outputs: HashMap<String, serde_json::Value>,

    /// Error message, present iff `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Terminal context, for diagnostics
    #[serde(skip)]
    pub context: Option<ChainContext>,
}

impl ChainResult {
    /// Derive a result from a terminal context
    ///
    /// Pure projection: deriving twice from the same context yields equal
    /// results.
    pub fn from_context(context: &ChainContext) -> Self {
        if context.has_error() {
            return Self {
                success: false,
                output: None,
                outputs: context.outputs().clone(),
                error: Some(
                    context
                        .error_message()
                        .unwrap_or("Unknown error")
                        .to_string(),
                ),
                context: Some(context.clone()),
            };
        }

        let outputs = context.outputs().clone();
        let output = outputs.get("output").map(value_to_string);

        Self {
            success: true,
            output,
            outputs,
            error: None,
            context: Some(context.clone()),
        }
    }

    /// Wrap a single output string
    pub fn success(output: impl Into<String>) -> Self {
        let output = output.into();
        let mut outputs = HashMap::new();
        outputs.insert("output".to_string(), serde_json::Value::String(output.clone()));

        Self {
            success: true,
            output: Some(output),
            outputs,
            error: None,
            context: None,
        }
    }

    /// Wrap an output mapping, deriving the primary output from the
    /// `"output"` key when present
    pub fn success_with_outputs(outputs: HashMap<String, serde_json::Value>) -> Self {
        let output = outputs.get("output").map(value_to_string);

        Self {
            success: true,
            output,
            outputs,
            error: None,
            context: None,
        }
    }

    /// Create a failure result with no context
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            outputs: HashMap::new(),
            error: Some(error.into()),
            context: None,
        }
    }
}
