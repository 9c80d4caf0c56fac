//! Completion backend abstraction.

use async_trait::async_trait;

use crate::error::LlmError;

/// One chat completion: a system instruction plus the user prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A model service that turns a prompt into text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Request a completion. Returns the raw text, which may be empty.
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;
}
