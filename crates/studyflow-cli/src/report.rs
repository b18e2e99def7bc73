//! The `run` report: what was asked, what was parsed, what each adapter did.

use serde::{Deserialize, Serialize};

use studyflow_adapters::{ActionResult, ActionStatus};
use studyflow_intent::{ParseOutcome, ParseSource, TaskBatch};

/// Outcome of one `run` invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub query: String,
    pub parsed_tasks: TaskBatch,
    pub source: ParseSource,
    pub results: Vec<ActionResult>,
    /// Wall-clock seconds spent parsing and dispatching.
    pub execution_time: f64,
}

impl RunReport {
    pub fn new(
        query: impl Into<String>,
        outcome: ParseOutcome,
        results: Vec<ActionResult>,
        execution_time: f64,
    ) -> Self {
        Self {
            query: query.into(),
            parsed_tasks: outcome.batch,
            source: outcome.source,
            results,
            execution_time,
        }
    }

    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_error()).count()
    }

    /// One line per result, for the REPL.
    pub fn summary_lines(&self) -> Vec<String> {
        if self.results.is_empty() {
            return vec!["  (nothing to do)".to_string()];
        }
        self.results
            .iter()
            .map(|result| {
                let marker = match result.status {
                    ActionStatus::Success => "ok",
                    ActionStatus::Mock => "demo",
                    ActionStatus::Error => "error",
                };
                format!(
                    "  [{marker}] {} via {}: {}",
                    result.action, result.app, result.message
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyflow_adapters::ActionRunner;
    use studyflow_intent::{App, Intent, Priority, TaskIntent};

    fn task(title: &str) -> Intent {
        Intent::CreateTask(TaskIntent {
            app: App::Notion,
            title: title.into(),
            due_date: None,
            priority: Priority::Medium,
            description: None,
        })
    }

    #[tokio::test]
    async fn report_serializes_expected_fields() {
        let batch = TaskBatch::single(task("Réviser"));
        let results = ActionRunner::demo().execute_batch(&batch).await;
        let outcome = ParseOutcome {
            batch,
            source: ParseSource::Rules,
        };
        let report = RunReport::new("Réviser", outcome, results, 0.01);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["query"], "Réviser");
        assert_eq!(json["source"], "rules");
        assert_eq!(json["parsed_tasks"]["tasks"][0]["action"], "create_task");
        assert_eq!(json["results"][0]["status"], "mock");
        assert!(json["execution_time"].is_f64());
        assert_eq!(report.error_count(), 0);
    }

    #[tokio::test]
    async fn summary_marks_errors() {
        let batch = TaskBatch::single(task("Réviser"));
        let results = ActionRunner::new().execute_batch(&batch).await;
        let outcome = ParseOutcome {
            batch,
            source: ParseSource::Rules,
        };
        let report = RunReport::new("Réviser", outcome, results, 0.0);

        assert_eq!(report.error_count(), 1);
        let lines = report.summary_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("  [error] create_task via notion"));
    }

    #[test]
    fn empty_report_has_placeholder_line() {
        let outcome = ParseOutcome {
            batch: TaskBatch::default(),
            source: ParseSource::Rules,
        };
        let report = RunReport::new("", outcome, Vec::new(), 0.0);
        assert_eq!(report.summary_lines(), vec!["  (nothing to do)".to_string()]);
    }
}
