//! Notion adapter (demo mode): pages and database tasks.

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use studyflow_intent::{ActionKind, App, Intent, PageIntent, Priority, TaskIntent};

use crate::error::{AdapterError, Result};
use crate::traits::{ActionResult, HealthStatus, ServiceAdapter, mock_id};

const NOTION_URL: &str = "https://www.notion.so/";

const SUPPORTED: &[ActionKind] = &[ActionKind::CreatePage, ActionKind::CreateTask];

/// Demo Notion adapter.
#[derive(Debug, Clone)]
pub struct NotionAdapter {
    id: String,
    /// Database used when a page names none.
    default_database: Option<String>,
}

impl NotionAdapter {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            default_database: None,
        }
    }

    pub fn with_database(mut self, database_id: impl Into<String>) -> Self {
        self.default_database = Some(database_id.into());
        self
    }

    fn create_page(&self, intent: &Intent, page: &PageIntent) -> ActionResult {
        let database_id = page.database_id.as_ref().or(self.default_database.as_ref());
        info!(adapter = %self.id, title = %page.title, "[DEMO] creating Notion page");

        ActionResult::mock(
            intent,
            format!("[DEMO] Notion page '{}' created", page.title),
            json!({
                "page_id": mock_id("page"),
                "page_url": NOTION_URL,
                "title": page.title,
                "content": page.content.as_deref().unwrap_or("No content"),
                "database_id": database_id,
            }),
        )
    }

    fn create_task(&self, intent: &Intent, task: &TaskIntent) -> ActionResult {
        info!(
            adapter = %self.id,
            title = %task.title,
            priority = %task.priority,
            "[DEMO] creating Notion task"
        );

        ActionResult::mock(
            intent,
            format!("[DEMO] Notion task '{}' created", task.title),
            json!({
                "task_id": mock_id("task"),
                "task_url": NOTION_URL,
                "title": task.title,
                "due_date": task
                    .due_date
                    .map_or_else(|| "No date".to_string(), |d| d.format("%Y-%m-%d").to_string()),
                "priority": priority_label(task.priority),
                "description": task.description.as_deref().unwrap_or("No description"),
            }),
        )
    }
}

impl Default for NotionAdapter {
    fn default() -> Self {
        Self::new("notion")
    }
}

/// `"🔴 high"`, `"🟡 medium"`, `"🟢 low"`.
pub fn priority_label(priority: Priority) -> String {
    let marker = match priority {
        Priority::High => "🔴",
        Priority::Medium => "🟡",
        Priority::Low => "🟢",
    };
    format!("{marker} {priority}")
}

#[async_trait]
impl ServiceAdapter for NotionAdapter {
    fn id(&self) -> &str {
        &self.id
    }

    fn app(&self) -> App {
        App::Notion
    }

    fn supported_actions(&self) -> &'static [ActionKind] {
        SUPPORTED
    }

    async fn health_check(&self) -> Result<HealthStatus> {
        Ok(HealthStatus::Degraded)
    }

    async fn execute(&self, intent: &Intent) -> Result<ActionResult> {
        match intent {
            Intent::CreatePage(page) => Ok(self.create_page(intent, page)),
            Intent::CreateTask(task) => Ok(self.create_task(intent, task)),
            other => Err(AdapterError::UnsupportedAction {
                adapter_id: self.id.clone(),
                action: other.action(),
            }),
        }
    }
}
