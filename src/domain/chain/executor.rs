//! Chain executor - runs an ordered step list against a shared context

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::time::{timeout, Duration};
use tokio_util::sync::CancellationToken;

use crate::config::ChainConfig;

use super::context::ChainContext;
use super::error::ChainError;
use super::result::ChainResult;
use super::step::ChainStep;

/// An ordered sequence of steps sharing one execution context
pub struct Chain {
    name: String,
    steps: Vec<Arc<dyn ChainStep>>,
}

impl Chain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: impl ChainStep + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Arc<dyn ChainStep>] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("name", &self.name)
            .field("steps", &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// Lifecycle of a single chain run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Context created, no steps run
    Pending,
    /// Steps executing in declared order
    Running,
    Succeeded,
    Failed,
}

/// Executes chains with fail-fast error propagation
///
/// Each run owns its context exclusively; multiple runs may proceed
/// concurrently sharing only the backing stores. A run terminates at the
/// first error from a non-fault-tolerant step, skipping all remaining steps.
/// Retries are not performed at this layer - transient provider failures are
/// the provider gateway's concern.
#[derive(Debug)]
pub struct ChainExecutor {
    config: ChainConfig,
}

impl ChainExecutor {
    pub fn new() -> Self {
        Self {
            config: ChainConfig::default(),
        }
    }

    pub fn with_config(config: ChainConfig) -> Self {
        Self { config }
    }

    /// Execute a chain with the given initial variables
    pub async fn execute(
        &self,
        chain: &Chain,
        variables: HashMap<String, serde_json::Value>,
    ) -> ChainResult {
        self.execute_with_cancellation(chain, variables, CancellationToken::new())
            .await
    }

    /// Execute a chain, checking the token between steps
    ///
    /// Cancellation takes effect at the next step boundary; an in-flight step
    /// runs to completion and its result is discarded with the run.
    pub async fn execute_with_cancellation(
        &self,
        chain: &Chain,
        variables: HashMap<String, serde_json::Value>,
        cancellation: CancellationToken,
    ) -> ChainResult {
        let context = ChainContext::from_variables(variables);
        let execution_id = context.execution_id().to_string();
        let started = Instant::now();

        tracing::info!(
            chain = chain.name(),
            execution_id = %execution_id,
            state = ?RunState::Pending,
            "starting chain execution"
        );

        let timeout_duration = Duration::from_secs(self.config.timeout_seconds);
        let result = match timeout(timeout_duration, self.run_steps(chain, context, cancellation)).await
        {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(chain = chain.name(), execution_id = %execution_id, "chain execution timed out");
                ChainResult::failure(ChainError::Timeout(self.config.timeout_seconds).to_string())
            }
        };

        let state = if result.success {
            RunState::Succeeded
        } else {
            RunState::Failed
        };
        tracing::info!(
            chain = chain.name(),
            execution_id = %execution_id,
            state = ?state,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "chain execution finished"
        );

        result
    }

    /// Execute the same chain over several variable sets concurrently
    pub async fn execute_batch(
        &self,
        chain: &Chain,
        batches: Vec<HashMap<String, serde_json::Value>>,
    ) -> Vec<ChainResult> {
        futures::future::join_all(
            batches
                .into_iter()
                .map(|variables| self.execute(chain, variables)),
        )
        .await
    }

    /// Convenience wrapper: run with a single `"input"` variable and return
    /// the primary output text
    pub async fn run(&self, chain: &Chain, input: &str) -> Result<String, ChainError> {
        let mut variables = HashMap::new();
        variables.insert(
            "input".to_string(),
            serde_json::Value::String(input.to_string()),
        );

        let result = self.execute(chain, variables).await;
        if !result.success {
            return Err(ChainError::step_execution(
                chain.name(),
                result.error.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        result
            .output
            .ok_or_else(|| ChainError::invalid_input("chain produced no primary output"))
    }

    async fn run_steps(
        &self,
        chain: &Chain,
        mut context: ChainContext,
        cancellation: CancellationToken,
    ) -> ChainResult {
        if chain.is_empty() {
            context.fail("No steps to execute");
            return ChainResult::from_context(&context);
        }

        for step in chain.steps() {
            if cancellation.is_cancelled() {
                tracing::warn!(
                    chain = chain.name(),
                    execution_id = context.execution_id(),
                    "chain execution cancelled"
                );
                context.fail(ChainError::Cancelled.to_string());
                break;
            }

            tracing::debug!(
                chain = chain.name(),
                step = step.name(),
                state = ?RunState::Running,
                "executing chain step"
            );

            match step.execute(&mut context).await {
                // A step may also fail the context directly
                Ok(()) => {
                    if context.has_error() {
                        break;
                    }
                }
                Err(error) if step.fault_tolerant() => {
                    tracing::warn!(
                        chain = chain.name(),
                        step = step.name(),
                        error = %error,
                        "fault-tolerant step failed, continuing"
                    );
                    context.set_output(
                        format!("{}_error", step.name()),
                        serde_json::Value::String(error.to_string()),
                    );
                }
                Err(error) => {
                    tracing::error!(
                        chain = chain.name(),
                        step = step.name(),
                        error = %error,
                        "chain step failed"
                    );
                    context.fail(format!("Step '{}' failed: {}", step.name(), error));
                    break;
                }
            }
        }

        ChainResult::from_context(&context)
    }
}

impl Default for ChainExecutor {
    fn default() -> Self {
        Self::new()
    }
}
