//! Google Tasks adapter (demo mode).

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use studyflow_intent::{ActionKind, App, Intent};

use crate::error::{AdapterError, Result};
use crate::traits::{ActionResult, HealthStatus, ServiceAdapter, mock_id};

const SUPPORTED: &[ActionKind] = &[ActionKind::CreateTask];

/// Demo Google Tasks adapter.
#[derive(Debug, Clone)]
pub struct GoogleTasksAdapter {
    id: String,
}

impl GoogleTasksAdapter {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Default for GoogleTasksAdapter {
    fn default() -> Self {
        Self::new("google-tasks")
    }
}

#[async_trait]
impl ServiceAdapter for GoogleTasksAdapter {
    fn id(&self) -> &str {
        &self.id
    }

    fn app(&self) -> App {
        App::GoogleTasks
    }

    fn supported_actions(&self) -> &'static [ActionKind] {
        SUPPORTED
    }

    async fn health_check(&self) -> Result<HealthStatus> {
        Ok(HealthStatus::Degraded)
    }

    async fn execute(&self, intent: &Intent) -> Result<ActionResult> {
        let Intent::CreateTask(task) = intent else {
            return Err(AdapterError::UnsupportedAction {
                adapter_id: self.id.clone(),
                action: intent.action(),
            });
        };

        info!(adapter = %self.id, title = %task.title, "[DEMO] creating Google task");

        Ok(ActionResult::mock(
            intent,
            format!("[DEMO] Google task '{}' created", task.title),
            json!({
                "task_id": mock_id("gtask"),
                "title": task.title,
                "due_date": task
                    .due_date
                    .map_or_else(|| "No date".to_string(), |d| d.format("%Y-%m-%d").to_string()),
                "notes": task.description.as_deref().unwrap_or("No notes"),
            }),
        ))
    }
}
