//! Embedding backends

mod openai;

pub use openai::OpenAiEmbeddingProvider;
