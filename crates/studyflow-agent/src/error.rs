//! Agent error types.
//!
//! All LLM client failures surface through [`AgentError`].  Each variant
//! carries enough context for callers to decide how to handle the failure.

/// Unified error type for the LLM client.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    // -- LLM errors ----------------------------------------------------------
    /// An HTTP request to the LLM provider failed.
    #[error("llm request failed: {reason}")]
    LlmRequestFailed { reason: String },

    /// The LLM response could not be parsed into the expected format.
    #[error("llm response parse error: {reason}")]
    LlmParseFailed { reason: String },

    /// The API key is missing for a provider that requires one.
    #[error("missing api key for provider: {provider}")]
    MissingApiKey { provider: String },

    // -- Configuration errors ------------------------------------------------
    /// Configuration validation failed.
    #[error("config error: {reason}")]
    ConfigError { reason: String },

    // -- Serialization -------------------------------------------------------
    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the agent crate.
pub type Result<T> = std::result::Result<T, AgentError>;

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        Self::LlmRequestFailed {
            reason: err.to_string(),
        }
    }
}
