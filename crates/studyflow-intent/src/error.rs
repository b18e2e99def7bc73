//! Intent engine error types.
//!
//! Rule-based extraction never fails at parse time; errors only come from
//! building the matchers and from the LLM tier.

/// Unified error type for the intent engine.
#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    // -- Construction errors -------------------------------------------------
    /// A vocabulary entry produced a regex that does not compile.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A keyword automaton could not be built.
    #[error("failed to build keyword index: {reason}")]
    KeywordIndex { reason: String },

    /// A language name that has no vocabulary.
    #[error("unknown language `{name}` (expected `fr` or `en`)")]
    UnknownLanguage { name: String },

    // -- LLM tier errors -----------------------------------------------------
    /// The LLM reply did not contain a usable task list.
    #[error("unusable LLM reply: {reason}")]
    LlmReply { reason: String },

    // -- Upstream crate errors -----------------------------------------------
    /// An error propagated from the agent crate.
    #[error("agent error: {0}")]
    Agent(#[from] studyflow_agent::AgentError),

    // -- Serialization -------------------------------------------------------
    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the intent crate.
pub type Result<T> = std::result::Result<T, IntentError>;
