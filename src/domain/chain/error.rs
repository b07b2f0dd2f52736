//! Chain execution error types

use thiserror::Error;

use crate::domain::memory::MemoryError;
use crate::domain::provider::ProviderError;
use crate::domain::vector_store::VectorStoreError;

/// Errors that can occur while executing a chain
///
/// Provider and store errors pass through transparently so their stable
/// error codes survive into the failure message seen by the calling layer.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Step '{step}' failed: {message}")]
    StepExecution { step: String, message: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    VectorStore(#[from] VectorStoreError),

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error("Variable resolution failed: {0}")]
    VariableResolution(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Execution timed out after {0} seconds")]
    Timeout(u64),

    #[error("Execution cancelled")]
    Cancelled,
}

impl ChainError {
    pub fn step_execution(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StepExecution {
            step: step.into(),
            message: message.into(),
        }
    }

    pub fn variable_resolution(message: impl Into<String>) -> Self {
        Self::VariableResolution(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
