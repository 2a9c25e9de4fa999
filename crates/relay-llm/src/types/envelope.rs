use serde::Serialize;

use super::usage::UsageRecord;

/// Content returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseContent {
    /// Raw model output, or an empty string on failure
    Text(String),
    /// Model output parsed and validated against the driver's schema
    Structured(serde_json::Value),
}

impl ResponseContent {
    /// Raw text, if the content was not parsed
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }

    /// Parsed object, if the content was validated against a schema
    pub const fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Text(_) => None,
            Self::Structured(value) => Some(value),
        }
    }
}

impl Default for ResponseContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// Outcome of one `RequestDriver::request` call
///
/// Exactly one of `content` and `error` is meaningful: a successful call
/// carries the model output and no error, a failed call carries empty
/// text content, the last error message and an all-zero usage record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    /// Model output
    pub content: ResponseContent,
    /// Error message of the final failed attempt
    pub error: Option<String>,
    /// Token and cost usage of the successful attempt
    pub usage: UsageRecord,
}

impl ResponseEnvelope {
    /// Successful outcome
    pub const fn success(content: ResponseContent, usage: UsageRecord) -> Self {
        Self {
            content,
            error: None,
            usage,
        }
    }

    /// Failed outcome after all attempts were exhausted
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            content: ResponseContent::default(),
            error: Some(error.into()),
            usage: UsageRecord::ZERO,
        }
    }

    /// Whether the call produced content
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Split into content or error message
    ///
    /// # Errors
    ///
    /// Returns the error message of a failed call
    pub fn into_result(self) -> Result<(ResponseContent, UsageRecord), String> {
        match self.error {
            None => Ok((self.content, self.usage)),
            Some(error) => Err(error),
        }
    }
}
