//! LLM-backed extraction.
//!
//! The model is asked for a `{"tasks": [...]}` object in the same shape the
//! rule-based extractor produces.  Replies are cleaned of markdown fences and
//! surrounding chatter; entries that do not deserialize are dropped.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info, warn};

use studyflow_agent::{ChatRequest, LlmClient, Message};

use crate::error::{IntentError, Result};
use crate::types::{Intent, ParsedRequest, TaskBatch};

/// Sampling temperature used unless overridden.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Reply budget used unless overridden.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

const SYSTEM_PROMPT: &str = r#"You convert natural-language requests from a student into structured JSON actions.

Available actions:
- create_event (app "google_calendar"): title, date (YYYY-MM-DD), time (HH:MM, 24h), duration_minutes (default 60), description, location
- create_task (app "notion" or "google_tasks"): title, due_date (YYYY-MM-DD, optional), priority ("low" | "medium" | "high"), description
- create_page (app "notion"): title, content, database_id (optional)
- update_event (app "google_calendar"): event_id, plus any field of create_event to change
- delete_event (app "google_calendar"): event_id

Resolve relative dates ("demain", "mardi", "next friday") against today's date.
A weekday always means its next occurrence after today.

Respond ONLY with a JSON object, no text before or after:
{
  "tasks": [
    {"action": "create_event", "app": "google_calendar", "title": "...", "date": "2025-11-28", "time": "10:00", "duration_minutes": 60}
  ]
}"#;

/// Extracts intents by prompting a chat model.
pub struct LlmExtractor {
    client: Arc<LlmClient>,
    /// Empty means the client's default model.
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmExtractor {
    pub fn new(client: Arc<LlmClient>) -> Self {
        Self {
            client,
            model: String::new(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// The model requests are sent to.
    pub fn model(&self) -> &str {
        if self.model.is_empty() {
            self.client.default_model()
        } else {
            &self.model
        }
    }

    /// Ask the model for the intents in `request`.
    pub async fn extract(&self, request: &ParsedRequest) -> Result<TaskBatch> {
        let chat = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(system_prompt(request.today())),
                Message::user(request.text.as_str()),
            ],
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
        };

        debug!(model = %self.model(), "sending intent extraction request");
        let response = self.client.chat(&chat).await?;

        let batch = parse_task_batch_reply(&response.text)?;
        info!(
            model = %self.model(),
            tasks = batch.len(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "intents extracted by LLM"
        );
        Ok(batch)
    }
}

impl std::fmt::Debug for LlmExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmExtractor")
            .field("model", &self.model())
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn system_prompt(today: NaiveDate) -> String {
    format!(
        "{SYSTEM_PROMPT}\n\nToday is {} ({}).",
        today.format("%Y-%m-%d"),
        today.format("%A")
    )
}

/// Parse a model reply into a batch.
///
/// Accepts optional ```` ```json ```` fences and text around the JSON
/// object.  Fails when the reply holds no object, no `tasks` array, or no
/// entry that deserializes into an [`Intent`].
pub fn parse_task_batch_reply(reply: &str) -> Result<TaskBatch> {
    let cleaned = reply.trim();
    let cleaned = cleaned.strip_prefix("```json").unwrap_or(cleaned);
    let cleaned = cleaned.strip_prefix("```").unwrap_or(cleaned);
    let cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned);
    let cleaned = cleaned.trim();

    let object = match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => &cleaned[start..=end],
        _ => {
            return Err(IntentError::LlmReply {
                reason: "no JSON object in reply".into(),
            });
        }
    };

    let value: Value = serde_json::from_str(object).map_err(|e| IntentError::LlmReply {
        reason: format!("reply is not valid JSON: {e}"),
    })?;

    let entries = value
        .get("tasks")
        .and_then(Value::as_array)
        .ok_or_else(|| IntentError::LlmReply {
            reason: "reply has no `tasks` array".into(),
        })?;

    let mut tasks = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match serde_json::from_value::<Intent>(entry.clone()) {
            Ok(intent) => tasks.push(intent),
            Err(e) => warn!(index, error = %e, "dropping malformed task from LLM reply"),
        }
    }

    if tasks.is_empty() {
        return Err(IntentError::LlmReply {
            reason: format!("none of the {} task(s) in reply is usable", entries.len()),
        });
    }

    Ok(TaskBatch::new(tasks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionKind, App, Priority};

    #[test]
    fn plain_reply() {
        let reply = r#"{"tasks": [{"action": "create_task", "app": "notion", "title": "Réviser", "priority": "high"}]}"#;
        let batch = parse_task_batch_reply(reply).unwrap();
        assert_eq!(batch.len(), 1);
        match &batch.tasks[0] {
            Intent::CreateTask(task) => {
                assert_eq!(task.title, "Réviser");
                assert_eq!(task.priority, Priority::High);
            }
            other => panic!("expected task, got {other:?}"),
        }
    }

    #[test]
    fn fenced_reply_with_several_tasks() {
        let reply = "```json\n{\"tasks\": [\
            {\"action\": \"create_event\", \"app\": \"google_calendar\", \"title\": \"Exam\", \"date\": \"2025-11-28\", \"time\": \"10:00\"},\
            {\"action\": \"create_page\", \"title\": \"Fiches\"}\
        ]}\n```";
        let batch = parse_task_batch_reply(reply).unwrap();
        let actions: Vec<_> = batch.iter().map(Intent::action).collect();
        assert_eq!(actions, vec![ActionKind::CreateEvent, ActionKind::CreatePage]);
        assert_eq!(batch.tasks[1].app(), App::Notion);
    }

    #[test]
    fn chatter_around_json_is_ignored() {
        let reply = "Voici le JSON :\n{\"tasks\": [{\"action\": \"delete_event\", \"event_id\": \"abc\"}]}\nBonne journée";
        let batch = parse_task_batch_reply(reply).unwrap();
        assert_eq!(batch.tasks[0].action(), ActionKind::DeleteEvent);
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let reply = r#"{"tasks": [
            {"action": "create_event", "title": "No date"},
            {"action": "invalid_action", "title": "x"},
            {"action": "create_task", "title": "Ok"}
        ]}"#;
        let batch = parse_task_batch_reply(reply).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.tasks[0].title(), Some("Ok"));
    }

    #[test]
    fn unusable_replies_are_errors() {
        for reply in [
            "not json at all",
            "{not json}",
            r#"{"actions": []}"#,
            r#"{"tasks": []}"#,
            r#"{"tasks": [{"action": "create_event"}]}"#,
        ] {
            let err = parse_task_batch_reply(reply).unwrap_err();
            assert!(matches!(err, IntentError::LlmReply { .. }), "{reply}: {err}");
        }
    }

    #[test]
    fn prompt_carries_today() {
        let today = NaiveDate::from_ymd_opt(2025, 11, 24).unwrap();
        let prompt = system_prompt(today);
        assert!(prompt.ends_with("Today is 2025-11-24 (Monday)."));
    }

    #[test]
    fn model_defaults_to_client_model() {
        let config = studyflow_agent::LlmClientConfig::openrouter(
            "test-key",
            "meta-llama/llama-3.1-8b-instruct",
        );
        let client = Arc::new(LlmClient::new(config).unwrap());
        let extractor = LlmExtractor::new(client.clone());
        assert_eq!(extractor.model(), "meta-llama/llama-3.1-8b-instruct");

        let extractor = LlmExtractor::new(client).with_model("other/model");
        assert_eq!(extractor.model(), "other/model");
    }
}
