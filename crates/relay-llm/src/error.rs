use thiserror::Error;

/// Errors that can occur while talking to a chat-completion endpoint
#[derive(Debug, Error)]
pub enum LlmError {
    /// The request never produced an HTTP response (connect, TLS, timeout)
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status
    #[error("upstream returned {status}: {message}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Error message from the response body, or the raw body
        message: String,
    },

    /// The endpoint answered 2xx but the body was not a usable completion
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The request could not be built from the given inputs
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl LlmError {
    /// Whether the endpoint refused the request because of its parameters
    ///
    /// OpenRouter answers 400 for malformed `response_format` values, 404
    /// when no upstream endpoint for the model supports the requested
    /// parameters, and some compatible servers use 422.
    pub const fn is_capability_rejection(&self) -> bool {
        matches!(self, Self::Upstream { status: 400 | 404 | 422, .. })
    }
}
