use thiserror::Error;

/// Errors that can occur while talking to OpenRouter
#[derive(Debug, Error)]
pub enum LlmError {
    /// Model could not be constructed from the given configuration
    #[error("{0}")]
    Configuration(String),

    /// A function call or function response could not be serialized
    #[error("failed to convert request: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Network failure or non-success response from the API
    #[error("openrouter error: {0}")]
    Upstream(String),

    /// A non-streaming response carried no choices
    #[error("openrouter returned no choices")]
    NoChoices,

    /// Transport failure while reading a streaming response
    #[error("openrouter stream recv error: {0}")]
    StreamRead(String),

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl LlmError {
    /// Error returned when no API key was configured
    pub(crate) fn missing_api_key() -> Self {
        Self::Configuration("OpenRouter API key is required".to_owned())
    }
}
