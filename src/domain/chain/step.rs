//! Chain step trait

use async_trait::async_trait;

use super::context::ChainContext;
use super::error::ChainError;

/// A single operation in a chain
///
/// Steps receive the run's context through a mutable borrow; they may read
/// and write variables and outputs, and call providers or stores. An error
/// from a non-fault-tolerant step terminates the run.
#[async_trait]
pub trait ChainStep: Send + Sync {
    /// Step name, used in logs and failure messages
    fn name(&self) -> &str;

    /// Execute the step against the current context
    async fn execute(&self, context: &mut ChainContext) -> Result<(), ChainError>;

    /// Whether the executor should continue past a failure of this step
    ///
    /// Fault-tolerant steps have their error recorded in the outputs instead
    /// of terminating the run.
    fn fault_tolerant(&self) -> bool {
        false
    }
}
