//! Backend trait and the OpenAI-compatible HTTP implementation

pub mod openai;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::protocol::openai::{ChatCompletionRequest, ChatCompletionResponse};

/// A chat-completion endpoint the driver sends requests to
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Human-readable backend name, used in logs
    fn name(&self) -> &str;

    /// Send one completion request and return the decoded response
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse, LlmError>;
}
