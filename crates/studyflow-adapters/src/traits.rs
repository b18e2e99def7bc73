//! Core adapter trait and result records.
//!
//! Every destination service implements [`ServiceAdapter`].  Executing an
//! intent produces an [`ActionResult`], the record reported back to the user.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use studyflow_intent::{ActionKind, App, Intent};

use crate::error::Result;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// The health status of an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// The adapter is fully operational.
    Healthy,
    /// The adapter works with reduced capability (demo mode, missing
    /// credentials).
    Degraded,
    /// The adapter is not functional.
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded => write!(f, "degraded"),
            Self::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Outcome of one dispatched intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    /// The live service accepted the action.
    Success,
    /// The action failed.
    Error,
    /// A demo adapter recorded the action without calling the service.
    Mock,
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

/// The record reported for one dispatched intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub action: ActionKind,
    pub app: App,
    pub status: ActionStatus,
    /// Human-readable summary.
    pub message: String,
    /// Service-specific payload (ids, links, normalized fields).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ActionResult {
    /// A demo-mode record for `intent`.
    pub fn mock(intent: &Intent, message: impl Into<String>, details: Value) -> Self {
        Self {
            action: intent.action(),
            app: intent.app(),
            status: ActionStatus::Mock,
            message: message.into(),
            details: Some(details),
        }
    }

    /// A failure record for `intent`.
    pub fn error(intent: &Intent, message: impl Into<String>) -> Self {
        Self {
            action: intent.action(),
            app: intent.app(),
            status: ActionStatus::Error,
            message: message.into(),
            details: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == ActionStatus::Error
    }
}

// ---------------------------------------------------------------------------
// Core trait
// ---------------------------------------------------------------------------

/// The interface every destination service implements.
#[async_trait]
pub trait ServiceAdapter: Send + Sync {
    /// Return the unique identifier for this adapter instance.
    fn id(&self) -> &str;

    /// The application this adapter serves.
    fn app(&self) -> App;

    /// Actions this adapter can execute.
    fn supported_actions(&self) -> &'static [ActionKind];

    /// Check whether the adapter is operational.
    async fn health_check(&self) -> Result<HealthStatus>;

    /// Perform `intent` against the service.
    ///
    /// Returns [`crate::AdapterError::UnsupportedAction`] for an action not
    /// listed in [`ServiceAdapter::supported_actions`].
    async fn execute(&self, intent: &Intent) -> Result<ActionResult>;
}

/// Generate a mock record identifier such as `mock_event_0192...`.
pub(crate) fn mock_id(kind: &str) -> String {
    format!("mock_{kind}_{}", uuid::Uuid::now_v7().simple())
}
