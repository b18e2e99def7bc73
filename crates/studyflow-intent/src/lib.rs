//! Intent extraction for Studyflow.
//!
//! This crate turns a free-form instruction such as
//! `"Ajoute un examen de maths mardi à 10h"` into a [`TaskBatch`] of
//! structured [`Intent`]s:
//!
//! - **Rule-based extraction**: an ordered chain of category rules (event,
//!   task, page, fallback) via [`extract::RuleBasedExtractor`].
//! - **Date/time resolution**: weekday / relative-day / clock-time parsing
//!   against an injected reference instant via [`datetime::DateTimeResolver`].
//! - **LLM tier**: an optional model-backed strategy via
//!   [`llm::LlmExtractor`], with fallback to the rules on any failure.
//!
//! [`parser::IntentParser`] ties the tiers together.

pub mod datetime;
pub mod error;
pub mod extract;
pub mod keywords;
pub mod llm;
pub mod parser;
pub mod types;
pub mod vocabulary;

pub use datetime::{DateTimeResolver, ResolvedDateTime};
pub use error::{IntentError, Result};
pub use extract::RuleBasedExtractor;
pub use llm::LlmExtractor;
pub use parser::{IntentExtractor, IntentParser, ParseOutcome, ParseSource};
pub use types::{
    ActionKind, App, EventDeletion, EventIntent, EventUpdate, Intent, PageIntent, ParsedRequest,
    Priority, TaskBatch, TaskIntent,
};
pub use vocabulary::{Language, Vocabulary};
