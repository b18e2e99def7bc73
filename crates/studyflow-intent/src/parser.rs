//! Intent parser: rule-based extraction with an optional LLM tier.
//!
//! 1. **LLM tier** (when configured): the model is asked for the intents.
//! 2. **Rule tier**: always available, used directly when no LLM is
//!    configured and as the fallback whenever the LLM tier fails.
//!
//! Parsing never fails from the caller's point of view; the outcome records
//! which tier produced the batch.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use studyflow_agent::LlmClient;

use crate::error::Result;
use crate::extract::RuleBasedExtractor;
use crate::llm::LlmExtractor;
use crate::types::{ParsedRequest, TaskBatch};
use crate::vocabulary::Language;

// ---------------------------------------------------------------------------
// Strategy trait
// ---------------------------------------------------------------------------

/// A way of turning a request into intents.
#[async_trait]
pub trait IntentExtractor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn extract(&self, request: &ParsedRequest) -> Result<TaskBatch>;
}

#[async_trait]
impl IntentExtractor for RuleBasedExtractor {
    fn name(&self) -> &'static str {
        "rules"
    }

    async fn extract(&self, request: &ParsedRequest) -> Result<TaskBatch> {
        Ok(RuleBasedExtractor::extract(self, request))
    }
}

#[async_trait]
impl IntentExtractor for LlmExtractor {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn extract(&self, request: &ParsedRequest) -> Result<TaskBatch> {
        LlmExtractor::extract(self, request).await
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// The tier that produced a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseSource {
    Rules,
    Llm,
}

/// A parsed batch and where it came from.
///
/// Serializes as the batch object plus a `source` field:
/// `{"tasks": [...], "source": "rules"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOutcome {
    #[serde(flatten)]
    pub batch: TaskBatch,
    pub source: ParseSource,
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// The intent parser.
///
/// Built once by the host and shared by reference; it holds no per-request
/// state.
pub struct IntentParser {
    rules: RuleBasedExtractor,

    /// Preferred strategy tried before the rules.
    strategy: Option<Arc<dyn IntentExtractor>>,
}

impl IntentParser {
    /// A rules-only parser for `language`.
    pub fn new(language: Language) -> Result<Self> {
        Ok(Self {
            rules: RuleBasedExtractor::new(language)?,
            strategy: None,
        })
    }

    /// Try `strategy` first and fall back to the rules when it fails.
    pub fn with_strategy(mut self, strategy: Arc<dyn IntentExtractor>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Use an LLM tier backed by `client`.
    pub fn with_llm(self, client: Arc<LlmClient>, model: impl Into<String>) -> Self {
        self.with_strategy(Arc::new(LlmExtractor::new(client).with_model(model)))
    }

    pub fn language(&self) -> Language {
        self.rules.language()
    }

    /// Name of the preferred tier (`rules` when none is configured).
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.as_ref().map_or("rules", |s| s.name())
    }

    /// Rule-based extraction only.
    pub fn parse_rules(&self, request: &ParsedRequest) -> TaskBatch {
        self.rules.extract(request)
    }

    /// Parse `request` with the preferred tier, falling back to the rules.
    pub async fn parse(&self, request: &ParsedRequest) -> ParseOutcome {
        debug!(text = %request.text, reference = %request.reference_time, "parsing request");

        if let Some(strategy) = &self.strategy {
            match strategy.extract(request).await {
                Ok(batch) if !batch.is_empty() => {
                    info!(strategy = strategy.name(), tasks = batch.len(), "request parsed");
                    return ParseOutcome {
                        batch,
                        source: ParseSource::Llm,
                    };
                }
                Ok(_) => {
                    warn!(strategy = strategy.name(), "strategy returned no task, using rules");
                }
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "strategy failed, using rules");
                }
            }
        }

        let batch = self.rules.extract(request);
        info!(strategy = "rules", tasks = batch.len(), "request parsed");
        ParseOutcome {
            batch,
            source: ParseSource::Rules,
        }
    }
}

impl std::fmt::Debug for IntentParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentParser")
            .field("language", &self.language())
            .field("strategy", &self.strategy_name())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
