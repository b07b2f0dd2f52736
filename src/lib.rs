//! Flowchain - AI chain execution and retrieval engine
//!
//! The AI-orchestration core of a workflow-automation backend:
//! - Chains of AI operations executed against pluggable providers
//! - Retrieval-augmented generation over a vector store with metadata
//!   filtering
//! - Per-session conversational memory with a rolling summary
//! - A typed provider error taxonomy with stable codes for the calling layer
//!
//! The surrounding web layer owns routing, persistence and credential
//! storage; it hands this crate an ordered step list plus initial variables
//! and receives a [`ChainResult`](domain::ChainResult) back.

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{
    ChainConfig, EngineConfig, LogFormat, LoggingConfig, MemoryConfig, ProviderConfig,
    ProviderType, RetrievalConfig,
};
pub use domain::{
    estimate_token_count, AiProvider, Chain, ChainContext, ChainError, ChainExecutor, ChainResult,
    ChainStep, CompletionRequest, CompletionResponse, CompletionStep, ConversationStep, Document,
    EmbeddingProvider, MemoryEntry, MemoryError, MemoryManager, MemoryRole, MemoryStore,
    MetadataFilter, PromptTemplate, ProviderError, RetrievalStep, RetryConfig, RetryingProvider,
    RunState, VectorStore, VectorStoreError,
};
pub use infrastructure::embedding::OpenAiEmbeddingProvider;
pub use infrastructure::http_client::{HttpClient, HttpClientTrait};
pub use infrastructure::memory::InMemoryMemoryStore;
pub use infrastructure::provider::{AnthropicProvider, OpenAiProvider, ProviderFactory};
pub use infrastructure::vector_store::InMemoryVectorStore;
