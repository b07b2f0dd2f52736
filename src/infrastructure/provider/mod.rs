//! AI provider backends

mod anthropic;
mod factory;
mod openai;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use openai::OpenAiProvider;
