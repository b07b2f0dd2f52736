//! Chain domain - execution context, result derivation, and the executor

mod context;
mod error;
mod executor;
mod result;
mod step;
mod steps;
mod template;

pub use context::ChainContext;
pub use error::ChainError;
pub use executor::{Chain, ChainExecutor, RunState};
pub use result::ChainResult;
pub use step::ChainStep;
pub use steps::{CompletionStep, ConversationStep, RetrievalStep};
pub use template::PromptTemplate;
