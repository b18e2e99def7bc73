//! Action runner: dispatches each intent of a batch to the adapter of its
//! application.
//!
//! A batch always runs to the end.  Missing adapters, unsupported actions
//! and adapter failures become `error` records in place.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use studyflow_intent::{App, Intent, TaskBatch};

use crate::calendar::CalendarAdapter;
use crate::error::AdapterError;
use crate::google_tasks::GoogleTasksAdapter;
use crate::notion::NotionAdapter;
use crate::traits::{ActionResult, HealthStatus, ServiceAdapter};

/// Health of one registered adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterHealth {
    pub id: String,
    pub app: App,
    pub status: HealthStatus,
}

/// Holds one adapter per application.
#[derive(Default)]
pub struct ActionRunner {
    adapters: HashMap<App, Arc<dyn ServiceAdapter>>,
}

impl ActionRunner {
    /// A runner with no adapters; every intent yields an error record.
    pub fn new() -> Self {
        Self::default()
    }

    /// A runner with the demo adapter for every application.
    pub fn demo() -> Self {
        Self::new()
            .with_adapter(Arc::new(CalendarAdapter::default()))
            .with_adapter(Arc::new(NotionAdapter::default()))
            .with_adapter(Arc::new(GoogleTasksAdapter::default()))
    }

    /// Register `adapter` for its application, replacing any previous one.
    pub fn with_adapter(mut self, adapter: Arc<dyn ServiceAdapter>) -> Self {
        self.register(adapter);
        self
    }

    pub fn register(&mut self, adapter: Arc<dyn ServiceAdapter>) {
        info!(adapter = adapter.id(), app = %adapter.app(), "adapter registered");
        self.adapters.insert(adapter.app(), adapter);
    }

    pub fn adapter(&self, app: App) -> Option<&Arc<dyn ServiceAdapter>> {
        self.adapters.get(&app)
    }

    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }

    /// Dispatch one intent.  Never fails; errors become `error` records.
    pub async fn execute(&self, intent: &Intent) -> ActionResult {
        let app = intent.app();
        let outcome = match self.adapters.get(&app) {
            Some(adapter) => adapter.execute(intent).await,
            None => Err(AdapterError::UnknownApp { app }),
        };

        outcome.unwrap_or_else(|e| {
            warn!(action = %intent.action(), %app, error = %e, "action failed");
            ActionResult::error(intent, format!("Error: {e}"))
        })
    }

    /// Dispatch every intent of `batch` in order, one record per intent.
    pub async fn execute_batch(&self, batch: &TaskBatch) -> Vec<ActionResult> {
        let total = batch.len();
        info!(total, "executing batch");

        let mut results = Vec::with_capacity(total);
        for (index, intent) in batch.iter().enumerate() {
            info!(
                task = index + 1,
                total,
                action = %intent.action(),
                app = %intent.app(),
                "executing task"
            );
            results.push(self.execute(intent).await);
        }
        results
    }

    /// Health of every registered adapter, sorted by application.
    pub async fn health(&self) -> Vec<AdapterHealth> {
        let mut report = Vec::with_capacity(self.adapters.len());
        for (app, adapter) in &self.adapters {
            let status = adapter
                .health_check()
                .await
                .unwrap_or(HealthStatus::Unhealthy);
            report.push(AdapterHealth {
                id: adapter.id().to_string(),
                app: *app,
                status,
            });
        }
        report.sort_by_key(|h| h.app.as_str());
        report
    }
}

impl std::fmt::Debug for ActionRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut apps: Vec<&str> = self.adapters.keys().map(|a| a.as_str()).collect();
        apps.sort_unstable();
        f.debug_struct("ActionRunner").field("apps", &apps).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ActionStatus;
    use studyflow_intent::{ActionKind, PageIntent, Priority, TaskIntent};

    fn task(app: App) -> Intent {
        Intent::CreateTask(TaskIntent {
            app,
            title: "t".into(),
            due_date: None,
            priority: Priority::Medium,
            description: None,
        })
    }

    #[tokio::test]
    async fn empty_runner_reports_unknown_app() {
        let runner = ActionRunner::new();
        let result = runner.execute(&task(App::Notion)).await;
        assert_eq!(result.status, ActionStatus::Error);
        assert!(result.message.contains("notion"), "{}", result.message);
    }

    #[tokio::test]
    async fn demo_runner_registers_all_apps() {
        let runner = ActionRunner::demo();
        assert_eq!(runner.adapter_count(), 3);
        for app in [App::GoogleCalendar, App::Notion, App::GoogleTasks] {
            assert!(runner.adapter(app).is_some(), "{app}");
        }

        let health = runner.health().await;
        let apps: Vec<App> = health.iter().map(|h| h.app).collect();
        assert_eq!(apps, vec![App::GoogleCalendar, App::GoogleTasks, App::Notion]);
        assert!(health.iter().all(|h| h.status == HealthStatus::Degraded));
    }

    #[tokio::test]
    async fn batch_continues_after_failure() {
        let runner = ActionRunner::demo();
        let batch = TaskBatch::new(vec![
            Intent::CreatePage(PageIntent {
                app: App::GoogleTasks,
                title: "wrong app".into(),
                content: None,
                database_id: None,
            }),
            task(App::Notion),
        ]);

        let results = runner.execute_batch(&batch).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].status, ActionStatus::Error);
        assert_eq!(results[0].action, ActionKind::CreatePage);
        assert_eq!(results[1].status, ActionStatus::Mock);
    }
}
