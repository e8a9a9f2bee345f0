// suggestions/llm/mod.rs - LLM adapter trait

pub mod openrouter;

use super::types::LLMError;
use async_trait::async_trait;

/// Trait for chat-completion adapters
#[async_trait]
pub trait LLMAdapter: Send + Sync {
    /// Generate a reply to `prompt` under the given system instruction
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, LLMError>;

    /// Provider name
    fn name(&self) -> &str;
}
