//! OpenAI-compatible chat completion wire format, with OpenRouter's
//! usage-accounting extension

use serde::{Deserialize, Serialize};

use crate::types::Message;

// -- Request types --

/// Chat completion request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier
    pub model: String,
    /// Conversation messages
    pub messages: Vec<Message>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Output formatting constraint, omitted for plain requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    /// OpenRouter usage accounting, merged into the top-level body
    pub usage: UsageOptions,
}

/// `response_format` request parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Any syntactically valid JSON object
    JsonObject,
    /// Output constrained to a JSON Schema
    JsonSchema {
        /// Named schema
        json_schema: JsonSchemaFormat,
    },
}

/// Named JSON Schema used for structured outputs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonSchemaFormat {
    /// Schema name
    pub name: String,
    /// Whether the endpoint must follow the schema exactly
    pub strict: bool,
    /// JSON Schema document
    pub schema: serde_json::Value,
}

/// OpenRouter `usage` request option
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UsageOptions {
    /// Ask the endpoint to report token counts and cost
    pub include: bool,
}

impl Default for UsageOptions {
    fn default() -> Self {
        Self { include: true }
    }
}

// -- Response types --

/// Chat completion response body
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    /// Generated choices
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Token usage, absent on some endpoints
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Choice within a response
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// Generated message
    pub message: ChoiceMessage,
    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Message within a response choice
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    /// Text content
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage and cost; any field may be missing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    /// Prompt tokens
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    /// Completion tokens
    #[serde(default)]
    pub completion_tokens: Option<u64>,
    /// Total tokens
    #[serde(default)]
    pub total_tokens: Option<u64>,
    /// Cost in credits
    #[serde(default)]
    pub cost: Option<f64>,
}

// -- Error response --

/// Error response body
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    /// Error message
    pub message: String,
}
