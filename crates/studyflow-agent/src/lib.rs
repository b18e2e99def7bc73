//! LLM client for Studyflow.
//!
//! This crate is the only part of the workspace that talks to a language
//! model.  The intent crate uses it for its LLM-backed parsing tier; the
//! rule-based tier never touches the network.
//!
//! ## Modules
//!
//! - [`llm`] -- LLM client and wire types.
//! - [`error`] -- Agent error types.

pub mod error;
pub mod llm;

// Re-export the most commonly used types at the crate root.
pub use error::{AgentError, Result};
pub use llm::{
    ChatRequest, ChatResponse, LlmClient, LlmClientConfig, LlmProvider, Message, Role, Usage,
};
