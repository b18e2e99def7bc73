//! Calendar adapter (demo mode).
//!
//! Records event creation, update and deletion as Google Calendar would
//! receive them, computing the start and end instants, without calling the
//! service.

use async_trait::async_trait;
use chrono::Duration;
use serde_json::json;
use tracing::info;

use studyflow_intent::{ActionKind, App, EventDeletion, EventIntent, EventUpdate, Intent};

use crate::error::{AdapterError, Result};
use crate::traits::{ActionResult, HealthStatus, ServiceAdapter, mock_id};

const CALENDAR_URL: &str = "https://calendar.google.com/calendar/";

const SUPPORTED: &[ActionKind] = &[
    ActionKind::CreateEvent,
    ActionKind::UpdateEvent,
    ActionKind::DeleteEvent,
];

/// Demo Google Calendar adapter.
#[derive(Debug, Clone)]
pub struct CalendarAdapter {
    id: String,
}

impl CalendarAdapter {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    fn create(&self, intent: &Intent, event: &EventIntent) -> Result<ActionResult> {
        let start = event.date.and_time(event.time);
        let end = start
            .checked_add_signed(Duration::minutes(i64::from(event.duration_minutes)))
            .ok_or_else(|| AdapterError::InvalidParams {
                action: ActionKind::CreateEvent,
                reason: format!("duration of {} minutes is out of range", event.duration_minutes),
            })?;

        info!(
            adapter = %self.id,
            title = %event.title,
            %start,
            %end,
            "[DEMO] creating calendar event"
        );

        Ok(ActionResult::mock(
            intent,
            format!("[DEMO] Event '{}' created in Google Calendar", event.title),
            json!({
                "event_id": mock_id("event"),
                "event_link": CALENDAR_URL,
                "start": start.format("%Y-%m-%dT%H:%M:%S").to_string(),
                "end": end.format("%Y-%m-%dT%H:%M:%S").to_string(),
                "title": event.title,
                "date": event.date.format("%Y-%m-%d").to_string(),
                "time": event.time.format("%H:%M").to_string(),
                "duration_minutes": event.duration_minutes,
                "description": event.description,
                "location": event.location,
            }),
        ))
    }

    fn update(&self, intent: &Intent, update: &EventUpdate) -> Result<ActionResult> {
        info!(adapter = %self.id, event_id = %update.event_id, "[DEMO] updating calendar event");
        Ok(ActionResult::mock(
            intent,
            format!("[DEMO] Event {} updated", update.event_id),
            serde_json::to_value(update)?,
        ))
    }

    fn delete(&self, intent: &Intent, deletion: &EventDeletion) -> Result<ActionResult> {
        info!(adapter = %self.id, event_id = %deletion.event_id, "[DEMO] deleting calendar event");
        Ok(ActionResult::mock(
            intent,
            format!("[DEMO] Event {} deleted", deletion.event_id),
            json!({ "event_id": deletion.event_id }),
        ))
    }
}

impl Default for CalendarAdapter {
    fn default() -> Self {
        Self::new("calendar")
    }
}

#[async_trait]
impl ServiceAdapter for CalendarAdapter {
    fn id(&self) -> &str {
        &self.id
    }

    fn app(&self) -> App {
        App::GoogleCalendar
    }

    fn supported_actions(&self) -> &'static [ActionKind] {
        SUPPORTED
    }

    async fn health_check(&self) -> Result<HealthStatus> {
        Ok(HealthStatus::Degraded)
    }

    async fn execute(&self, intent: &Intent) -> Result<ActionResult> {
        match intent {
            Intent::CreateEvent(event) => self.create(intent, event),
            Intent::UpdateEvent(update) => self.update(intent, update),
            Intent::DeleteEvent(deletion) => self.delete(intent, deletion),
            other => Err(AdapterError::UnsupportedAction {
                adapter_id: self.id.clone(),
                action: other.action(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ActionStatus;
    use chrono::{NaiveDate, NaiveTime};
    use studyflow_intent::{PageIntent, Priority, TaskIntent};

    fn event(minutes: u32) -> Intent {
        Intent::CreateEvent(EventIntent {
            app: App::GoogleCalendar,
            title: "maths".into(),
            date: NaiveDate::from_ymd_opt(2025, 11, 25).unwrap(),
            time: NaiveTime::from_hms_opt(23, 30, 0).unwrap(),
            duration_minutes: minutes,
            description: None,
            location: Some("Amphi B".into()),
        })
    }

    #[tokio::test]
    async fn create_event_computes_start_and_end() {
        let adapter = CalendarAdapter::default();
        let result = adapter.execute(&event(90)).await.unwrap();

        assert_eq!(result.status, ActionStatus::Mock);
        assert_eq!(result.action, ActionKind::CreateEvent);
        assert!(result.message.contains("[DEMO]"));
        let details = result.details.unwrap();
        assert_eq!(details["start"], "2025-11-25T23:30:00");
        assert_eq!(details["end"], "2025-11-26T01:00:00");
        assert_eq!(details["location"], "Amphi B");
        assert!(details["event_id"].as_str().unwrap().starts_with("mock_event_"));
    }

    #[tokio::test]
    async fn update_and_delete_are_recorded() {
        let adapter = CalendarAdapter::default();

        let update = Intent::UpdateEvent(EventUpdate {
            app: App::GoogleCalendar,
            event_id: "evt_42".into(),
            title: Some("Partiel".into()),
            date: None,
            time: None,
            duration_minutes: Some(120),
            description: None,
            location: None,
        });
        let result = adapter.execute(&update).await.unwrap();
        assert_eq!(result.message, "[DEMO] Event evt_42 updated");
        assert_eq!(result.details.unwrap()["duration_minutes"], 120);

        let delete = Intent::DeleteEvent(EventDeletion {
            app: App::GoogleCalendar,
            event_id: "evt_42".into(),
        });
        let result = adapter.execute(&delete).await.unwrap();
        assert_eq!(result.action, ActionKind::DeleteEvent);
        assert_eq!(result.status, ActionStatus::Mock);
    }

    #[tokio::test]
    async fn tasks_and_pages_are_unsupported() {
        let adapter = CalendarAdapter::default();
        let task = Intent::CreateTask(TaskIntent {
            app: App::GoogleCalendar,
            title: "x".into(),
            due_date: None,
            priority: Priority::Medium,
            description: None,
        });
        let page = Intent::CreatePage(PageIntent {
            app: App::GoogleCalendar,
            title: "x".into(),
            content: None,
            database_id: None,
        });

        for intent in [task, page] {
            let err = adapter.execute(&intent).await.unwrap_err();
            assert!(matches!(err, AdapterError::UnsupportedAction { .. }));
        }
    }

    #[tokio::test]
    async fn demo_adapter_reports_degraded() {
        let adapter = CalendarAdapter::new("cal-1");
        assert_eq!(adapter.id(), "cal-1");
        assert_eq!(adapter.health_check().await.unwrap(), HealthStatus::Degraded);
    }
}
