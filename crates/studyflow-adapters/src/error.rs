//! Adapter error types.
//!
//! The runner turns every [`AdapterError`] into an `error` result record, so
//! these never escape a batch run.

use studyflow_intent::{ActionKind, App};

/// Unified error type for Studyflow adapters.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// No adapter is registered for the intent's application.
    #[error("no adapter registered for application `{app}`")]
    UnknownApp { app: App },

    /// The adapter does not implement the requested action.
    #[error("action `{action}` is not supported by adapter `{adapter_id}`")]
    UnsupportedAction {
        adapter_id: String,
        action: ActionKind,
    },

    /// The intent carries values the service cannot accept.
    #[error("invalid parameters for `{action}`: {reason}")]
    InvalidParams { action: ActionKind, reason: String },

    /// The service call failed.
    #[error("execution failed for `{action}`: {reason}")]
    ExecutionFailed { action: ActionKind, reason: String },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Convenience alias used throughout the adapters crate.
pub type Result<T> = std::result::Result<T, AdapterError>;
