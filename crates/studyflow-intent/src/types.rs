//! Request and intent data model.
//!
//! Intents serialize with an `action` tag so that a [`TaskBatch`] has the
//! same JSON shape whether it came from the rule-based extractor or from an
//! LLM reply:
//!
//! ```json
//! {"tasks": [{"action": "create_event", "app": "google_calendar",
//!             "title": "maths", "date": "2025-11-25", "time": "10:00",
//!             "duration_minutes": 60}]}
//! ```

use std::fmt;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Event length used when the text does not state one.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// The raw input of a single parse plus the instant it is resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRequest {
    /// The user's instruction, verbatim.
    pub text: String,

    /// The "now" used for relative dates, in local wall-clock time.
    pub reference_time: NaiveDateTime,
}

impl ParsedRequest {
    /// Create a request resolved against an explicit reference instant.
    pub fn new(text: impl Into<String>, reference_time: NaiveDateTime) -> Self {
        Self {
            text: text.into(),
            reference_time,
        }
    }

    /// Create a request resolved against the current local time.
    pub fn now(text: impl Into<String>) -> Self {
        Self::new(text, Local::now().naive_local())
    }

    /// The calendar date of the reference instant.
    pub fn today(&self) -> NaiveDate {
        self.reference_time.date()
    }
}

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Destination service of an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum App {
    GoogleCalendar,
    Notion,
    GoogleTasks,
}

impl App {
    /// Wire identifier (`google_calendar`, `notion`, `google_tasks`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GoogleCalendar => "google_calendar",
            Self::Notion => "notion",
            Self::GoogleTasks => "google_tasks",
        }
    }

    fn google_calendar() -> Self {
        Self::GoogleCalendar
    }

    fn notion() -> Self {
        Self::Notion
    }
}

impl fmt::Display for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `action` tag of an [`Intent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateEvent,
    CreateTask,
    CreatePage,
    UpdateEvent,
    DeleteEvent,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateEvent => "create_event",
            Self::CreateTask => "create_task",
            Self::CreatePage => "create_page",
            Self::UpdateEvent => "update_event",
            Self::DeleteEvent => "delete_event",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Intents
// ---------------------------------------------------------------------------

/// A scheduled happening with a date, a start time and a length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventIntent {
    #[serde(default = "App::google_calendar")]
    pub app: App,
    pub title: String,
    #[serde(deserialize_with = "ymd::deserialize")]
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// A to-do item with an optional due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskIntent {
    #[serde(default = "App::notion")]
    pub app: App,
    pub title: String,
    #[serde(
        default,
        deserialize_with = "ymd::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A note / document page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageIntent {
    #[serde(default = "App::notion")]
    pub app: App,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
}

/// Replacement fields for an existing calendar event.  Only the LLM tier
/// produces these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventUpdate {
    #[serde(default = "App::google_calendar")]
    pub app: App,
    pub event_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "ymd::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<NaiveDate>,
    #[serde(default, with = "hhmm::option", skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Removal of an existing calendar event.  Only the LLM tier produces these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDeletion {
    #[serde(default = "App::google_calendar")]
    pub app: App,
    pub event_id: String,
}

/// One action the user wants performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Intent {
    CreateEvent(EventIntent),
    CreateTask(TaskIntent),
    CreatePage(PageIntent),
    UpdateEvent(EventUpdate),
    DeleteEvent(EventDeletion),
}

impl Intent {
    pub fn action(&self) -> ActionKind {
        match self {
            Self::CreateEvent(_) => ActionKind::CreateEvent,
            Self::CreateTask(_) => ActionKind::CreateTask,
            Self::CreatePage(_) => ActionKind::CreatePage,
            Self::UpdateEvent(_) => ActionKind::UpdateEvent,
            Self::DeleteEvent(_) => ActionKind::DeleteEvent,
        }
    }

    pub fn app(&self) -> App {
        match self {
            Self::CreateEvent(e) => e.app,
            Self::CreateTask(t) => t.app,
            Self::CreatePage(p) => p.app,
            Self::UpdateEvent(u) => u.app,
            Self::DeleteEvent(d) => d.app,
        }
    }

    /// The title, when the intent carries one.
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::CreateEvent(e) => Some(&e.title),
            Self::CreateTask(t) => Some(&t.title),
            Self::CreatePage(p) => Some(&p.title),
            Self::UpdateEvent(u) => u.title.as_deref(),
            Self::DeleteEvent(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// The ordered intents produced from one input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBatch {
    pub tasks: Vec<Intent>,
}

impl TaskBatch {
    pub fn new(tasks: Vec<Intent>) -> Self {
        Self { tasks }
    }

    pub fn single(intent: Intent) -> Self {
        Self {
            tasks: vec![intent],
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Intent> {
        self.tasks.iter()
    }
}

impl<'a> IntoIterator for &'a TaskBatch {
    type Item = &'a Intent;
    type IntoIter = std::slice::Iter<'a, Intent>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_MINUTES
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// `HH:MM` clock times.  Seconds are accepted on input and dropped on output.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(|e| D::Error::custom(format!("invalid time `{raw}`: {e}")))
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => super::serialize(t, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .map_err(|e| D::Error::custom(format!("invalid time `{raw}`: {e}"))),
                None => Ok(None),
            }
        }
    }
}

/// `YYYY-MM-DD` dates.  A trailing time part (`2025-11-26T14:30:00`) is
/// tolerated on input, since models often send one for due dates.
pub(crate) mod ymd {
    use chrono::NaiveDate;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    fn parse(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
        let raw = raw.trim();
        let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(|e| D::Error::custom(format!("invalid date `{raw}`: {e}")))
    }

    pub fn deserialize_option<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid date `{raw}`: {e}"))),
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
