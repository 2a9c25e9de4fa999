//! Retrying chat-completion driver for OpenRouter and compatible endpoints
//!
//! [`RequestDriver`] wraps a [`ChatBackend`] with a bounded retry loop,
//! negotiates the strictest JSON output mode the model accepts, and reports
//! token usage and cost with every response.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod backend;
pub mod driver;
pub mod error;
pub mod factory;
pub mod protocol;
pub mod retry;
pub mod schema;
pub mod strategy;
pub mod types;
pub mod usage;

pub use backend::ChatBackend;
pub use backend::openai::OpenAiCompatibleBackend;
pub use driver::RequestDriver;
pub use error::LlmError;
pub use factory::{create_custom_driver, create_driver, semantic_match_request};
pub use retry::RetryPolicy;
pub use schema::{AgentAction, OutputSchema, Reward, TypedSchema};
pub use strategy::ModeStrategy;
pub use types::{Message, ResponseContent, ResponseEnvelope, Role, UsageRecord};
pub use usage::{estimate_text_tokens, estimate_tokens, extract_usage};
