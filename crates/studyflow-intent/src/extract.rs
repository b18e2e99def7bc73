//! Rule-based intent extraction.
//!
//! Classification is an ordered list of rules; the first whose predicate
//! holds builds the single intent of the batch:
//!
//! | Rule       | Predicate                         | Intent        |
//! |------------|-----------------------------------|---------------|
//! | `event`    | an event keyword                  | `create_event` |
//! | `task`     | a task keyword and no page keyword | `create_task` |
//! | `page`     | a page keyword                    | `create_page`  |
//! | `fallback` | always                            | `create_task` |
//!
//! Extraction never fails: every field has a default.

use std::collections::HashSet;

use regex::Regex;
use tracing::debug;

use crate::datetime::DateTimeResolver;
use crate::error::Result;
use crate::keywords::{AnchorSet, KeywordSet, compile, word_alternation};
use crate::types::{
    App, DEFAULT_DURATION_MINUTES, EventIntent, Intent, PageIntent, ParsedRequest, Priority,
    TaskBatch, TaskIntent,
};
use crate::vocabulary::Language;

/// Title of an event whose text names nothing after the keyword.
pub const DEFAULT_EVENT_TITLE: &str = "Event";

/// Title of a page whose text names nothing after the keyword.
pub const DEFAULT_PAGE_TITLE: &str = "New page";

/// Fallback titles are cut to this many characters.
pub const FALLBACK_TITLE_CHARS: usize = 100;

/// Endings a priority keyword may carry and still count as one.
const PRIORITY_INFLECTIONS: &[&str] = &["", "e", "s", "es"];

/// Punctuation trimmed from the edges of title tokens.
const EDGE_PUNCTUATION: &[char] = &[',', '.', ';', ':', '!', '?', '(', ')', '"', '«', '»'];

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Category hits for one input, computed once.
struct Signals<'a> {
    text: &'a str,
    lowered: String,
    event: bool,
    task: bool,
    page: bool,
}

type Predicate = fn(&Signals<'_>) -> bool;
type Builder = fn(&RuleBasedExtractor, &ParsedRequest, &Signals<'_>) -> Intent;

struct Rule {
    name: &'static str,
    applies: Predicate,
    build: Builder,
}

fn has_event(s: &Signals<'_>) -> bool {
    s.event
}

fn has_task_without_page(s: &Signals<'_>) -> bool {
    s.task && !s.page
}

fn has_page(s: &Signals<'_>) -> bool {
    s.page
}

fn always(_: &Signals<'_>) -> bool {
    true
}

const RULES: &[Rule] = &[
    Rule {
        name: "event",
        applies: has_event,
        build: RuleBasedExtractor::event_intent,
    },
    Rule {
        name: "task",
        applies: has_task_without_page,
        build: RuleBasedExtractor::task_intent,
    },
    Rule {
        name: "page",
        applies: has_page,
        build: RuleBasedExtractor::page_intent,
    },
    Rule {
        name: "fallback",
        applies: always,
        build: RuleBasedExtractor::fallback_intent,
    },
];

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Keyword-driven extractor producing exactly one intent per input.
///
/// All matchers are compiled in [`RuleBasedExtractor::new`]; extraction
/// itself only reads them, so one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct RuleBasedExtractor {
    language: Language,

    event: KeywordSet,
    task: KeywordSet,
    page: KeywordSet,
    high_priority: KeywordSet,
    low_priority: KeywordSet,

    event_anchors: AnchorSet,
    task_anchors: AnchorSet,
    page_anchors: AnchorSet,

    /// Start of the first word that ends a title.
    stop: Regex,
    /// `<n> <unit>` with named groups `n`, `hours`, `minutes`.
    duration: Regex,

    /// Lowercased words skipped before a title starts.
    leading_skip: HashSet<String>,
    /// Lowercased words stripped from the end of a title.
    trailing_skip: HashSet<String>,
    /// Priority keywords, skipped before a title together with their
    /// inflections (`urgente`, `importants`).
    priority_words: Vec<&'static str>,
    elisions: Vec<&'static str>,

    resolver: DateTimeResolver,
}

impl RuleBasedExtractor {
    pub fn new(language: Language) -> Result<Self> {
        let vocab = language.vocabulary();

        let stop_words: Vec<&str> = vocab
            .weekdays
            .iter()
            .chain(vocab.tomorrow)
            .chain(vocab.day_after_tomorrow)
            .chain(vocab.connectors)
            .copied()
            .collect();
        let stop = compile(format!(
            r"(?i)(?:^|\s)(?:(?:{})(?:$|[\s,.;:!?])|\d)",
            word_alternation(&stop_words)
        ))?;

        let duration = compile(format!(
            r"(?i)(?P<n>\d+)\s*(?:(?P<hours>{})|(?P<minutes>{}))\b",
            word_alternation(vocab.hour_units),
            word_alternation(vocab.minute_units)
        ))?;

        let trailing_skip: HashSet<String> =
            vocab.fillers.iter().map(|w| w.to_string()).collect();
        let mut leading_skip = trailing_skip.clone();
        leading_skip.extend(
            stop_words
                .iter()
                .flat_map(|w| w.split_whitespace())
                .map(str::to_string),
        );

        let extractor = Self {
            language,
            event: KeywordSet::new(vocab.event_keywords)?,
            task: KeywordSet::new(vocab.task_keywords)?,
            page: KeywordSet::new(vocab.page_keywords)?,
            high_priority: KeywordSet::new(vocab.high_priority)?,
            low_priority: KeywordSet::new(vocab.low_priority)?,
            event_anchors: AnchorSet::new(vocab.event_keywords)?,
            task_anchors: AnchorSet::new(vocab.task_keywords)?,
            page_anchors: AnchorSet::new(vocab.page_keywords)?,
            stop,
            duration,
            leading_skip,
            trailing_skip,
            priority_words: vocab
                .high_priority
                .iter()
                .chain(vocab.low_priority)
                .copied()
                .collect(),
            elisions: vocab.elisions.to_vec(),
            resolver: DateTimeResolver::new(vocab)?,
        };

        debug!(language = %language, rules = RULES.len(), "rule-based extractor ready");
        Ok(extractor)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Classify `request` and build its single intent.
    pub fn extract(&self, request: &ParsedRequest) -> TaskBatch {
        let signals = self.signals(&request.text);

        let rule = RULES
            .iter()
            .find(|rule| (rule.applies)(&signals))
            .unwrap_or(&RULES[RULES.len() - 1]);

        debug!(
            rule = rule.name,
            event = signals.event,
            task = signals.task,
            page = signals.page,
            "rule matched"
        );

        TaskBatch::single((rule.build)(self, request, &signals))
    }

    fn signals<'a>(&self, text: &'a str) -> Signals<'a> {
        let lowered = text.to_lowercase();
        Signals {
            text,
            event: self.event.contains_any(&lowered),
            task: self.task.contains_any(&lowered),
            page: self.page.contains_any(&lowered),
            lowered,
        }
    }

    // -- Builders ------------------------------------------------------------

    fn event_intent(&self, request: &ParsedRequest, signals: &Signals<'_>) -> Intent {
        let title = self
            .title_after(&self.event_anchors, signals.text)
            .unwrap_or_else(|| DEFAULT_EVENT_TITLE.to_string());
        let when = self.resolver.resolve(signals.text, request.reference_time);

        Intent::CreateEvent(EventIntent {
            app: App::GoogleCalendar,
            title,
            date: when.date,
            time: when.time,
            duration_minutes: self.duration_minutes(signals.text),
            description: non_empty(signals.text),
            location: None,
        })
    }

    fn task_intent(&self, request: &ParsedRequest, signals: &Signals<'_>) -> Intent {
        let title = self
            .title_after(&self.task_anchors, signals.text)
            .unwrap_or_else(|| signals.text.trim().to_string());

        Intent::CreateTask(TaskIntent {
            app: App::Notion,
            title,
            due_date: self.resolver.explicit_date(signals.text, request.today()),
            priority: self.priority(&signals.lowered),
            description: non_empty(signals.text),
        })
    }

    fn page_intent(&self, _request: &ParsedRequest, signals: &Signals<'_>) -> Intent {
        let title = self
            .title_after(&self.page_anchors, signals.text)
            .unwrap_or_else(|| DEFAULT_PAGE_TITLE.to_string());

        Intent::CreatePage(PageIntent {
            app: App::Notion,
            title,
            content: non_empty(signals.text),
            database_id: None,
        })
    }

    fn fallback_intent(&self, _request: &ParsedRequest, signals: &Signals<'_>) -> Intent {
        Intent::CreateTask(TaskIntent {
            app: App::Notion,
            title: signals.text.trim().chars().take(FALLBACK_TITLE_CHARS).collect(),
            due_date: None,
            priority: Priority::Medium,
            description: non_empty(signals.text),
        })
    }

    // -- Fields --------------------------------------------------------------

    /// High beats low; neither is medium.
    pub fn priority(&self, lowered: &str) -> Priority {
        if self.high_priority.contains_any(lowered) {
            Priority::High
        } else if self.low_priority.contains_any(lowered) {
            Priority::Low
        } else {
            Priority::Medium
        }
    }

    /// First `<n> <unit>` in minutes, or the default length.
    pub fn duration_minutes(&self, text: &str) -> u32 {
        self.duration
            .captures_iter(text)
            .find_map(|caps| {
                let n: u32 = caps.name("n")?.as_str().parse().ok()?;
                if caps.name("hours").is_some() {
                    n.checked_mul(60)
                } else {
                    Some(n)
                }
            })
            .unwrap_or(DEFAULT_DURATION_MINUTES)
    }

    /// The phrase following the first anchor in `text`, cleaned up, or
    /// `None` when nothing usable is left.
    pub fn title_after(&self, anchors: &AnchorSet, text: &str) -> Option<String> {
        let rest = &text[anchors.end_of_first(text)?..];

        let mut tokens = rest.split_whitespace().peekable();
        while tokens.next_if(|t| self.skip_leading(t)).is_some() {}

        let remainder = tokens.collect::<Vec<_>>().join(" ");
        let phrase = match self.stop.find(&remainder) {
            Some(m) => &remainder[..m.start()],
            None => remainder.as_str(),
        };

        let mut words: Vec<&str> = phrase.split_whitespace().collect();
        while words.last().is_some_and(|w| self.skip_trailing(w)) {
            words.pop();
        }
        if let Some(first) = words.first_mut() {
            *first = self.strip_elision(*first);
        }

        let title = words.join(" ");
        let title = title.trim_matches(EDGE_PUNCTUATION).trim();
        (!title.is_empty()).then(|| title.to_string())
    }

    // -- Private helpers -----------------------------------------------------

    fn skip_leading(&self, token: &str) -> bool {
        let word = normalize(token);
        word.is_empty()
            || word.starts_with(|c: char| c.is_ascii_digit())
            || self.leading_skip.contains(&word)
            || self.is_priority_word(&word)
    }

    fn is_priority_word(&self, word: &str) -> bool {
        self.priority_words.iter().any(|p| {
            word.strip_prefix(p)
                .is_some_and(|suffix| PRIORITY_INFLECTIONS.contains(&suffix))
        })
    }

    fn skip_trailing(&self, token: &str) -> bool {
        let word = normalize(token);
        word.is_empty() || self.trailing_skip.contains(&word)
    }

    fn strip_elision<'t>(&self, token: &'t str) -> &'t str {
        let lowered = token.to_lowercase();
        self.elisions
            .iter()
            .find(|e| lowered.starts_with(**e) && lowered.len() > e.len())
            .and_then(|e| token.get(e.len()..))
            .unwrap_or(token)
    }
}

fn normalize(token: &str) -> String {
    token.trim_matches(EDGE_PUNCTUATION).to_lowercase()
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionKind;
    use chrono::{NaiveDate, NaiveTime};

    fn monday_request(text: &str) -> ParsedRequest {
        let now = NaiveDate::from_ymd_opt(2025, 11, 24)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        ParsedRequest::new(text, now)
    }

    fn fr() -> RuleBasedExtractor {
        RuleBasedExtractor::new(Language::French).unwrap()
    }

    fn en() -> RuleBasedExtractor {
        RuleBasedExtractor::new(Language::English).unwrap()
    }

    fn only(batch: TaskBatch) -> Intent {
        assert_eq!(batch.len(), 1, "rule path yields exactly one intent");
        batch.tasks.into_iter().next().unwrap()
    }

    #[test]
    fn exam_sentence_becomes_event() {
        let intent = only(fr().extract(&monday_request(
            "Ajoute un examen de maths mardi à 10h",
        )));
        match intent {
            Intent::CreateEvent(event) => {
                assert_eq!(event.title, "maths");
                assert_eq!(event.app, App::GoogleCalendar);
                assert_eq!(event.date, NaiveDate::from_ymd_opt(2025, 11, 25).unwrap());
                assert_eq!(event.time, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
                assert_eq!(event.duration_minutes, 60);
                assert_eq!(
                    event.description.as_deref(),
                    Some("Ajoute un examen de maths mardi à 10h")
                );
            }
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn event_wins_over_page_and_task() {
        let intent = only(fr().extract(&monday_request(
            "Ajoute une note pour le cours de physique",
        )));
        assert_eq!(intent.action(), ActionKind::CreateEvent);
        assert_eq!(intent.title(), Some("physique"));
    }

    #[test]
    fn page_keyword_suppresses_task() {
        let intent = only(fr().extract(&monday_request(
            "Crée une note sur la révolution française",
        )));
        assert_eq!(intent.action(), ActionKind::CreatePage);
        assert_eq!(intent.title(), Some("révolution française"));
    }

    #[test]
    fn task_title_skips_priority_adjective() {
        let intent = only(fr().extract(&monday_request(
            "Ajoute une tâche urgente: réviser le chapitre 3",
        )));
        match intent {
            Intent::CreateTask(task) => {
                assert_eq!(task.title, "réviser le chapitre");
                assert_eq!(task.priority, Priority::High);
                assert_eq!(task.due_date, None);
                assert_eq!(task.app, App::Notion);
            }
            other => panic!("expected task, got {other:?}"),
        }
    }

    #[test]
    fn task_title_keeps_words_sharing_a_priority_prefix() {
        let intent = only(en().extract(&monday_request("Add a task: highlight chapter 3")));
        assert_eq!(intent.title(), Some("highlight chapter"));

        let intent = only(en().extract(&monday_request("Add a task to lower the thermostat")));
        assert_eq!(intent.title(), Some("lower the thermostat"));

        let intent = only(fr().extract(&monday_request(
            "Ajoute une tâche: hauteur du plafond à mesurer",
        )));
        assert_eq!(intent.title(), Some("hauteur du plafond"));
    }

    #[test]
    fn inflected_priority_words_are_skipped() {
        let x = fr();
        for word in ["urgent", "urgente", "urgents", "urgentes", "Importante:", "basses"] {
            assert!(x.skip_leading(word), "{word}");
        }
        for word in ["urgentiste", "hauteur", "faiblesse", "importance"] {
            assert!(!x.skip_leading(word), "{word}");
        }
    }

    #[test]
    fn task_due_date_only_when_named() {
        let intent = only(fr().extract(&monday_request(
            "Tâche à faire: acheter du pain demain",
        )));
        match intent {
            Intent::CreateTask(task) => {
                assert_eq!(task.title, "acheter du pain");
                assert_eq!(
                    task.due_date,
                    Some(NaiveDate::from_ymd_opt(2025, 11, 25).unwrap())
                );
            }
            other => panic!("expected task, got {other:?}"),
        }
    }

    #[test]
    fn event_duration_and_time() {
        let intent = only(fr().extract(&monday_request(
            "Réunion projet jeudi à 14h30 pendant 2 heures",
        )));
        match intent {
            Intent::CreateEvent(event) => {
                assert_eq!(event.title, "projet");
                assert_eq!(event.time, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
                assert_eq!(event.duration_minutes, 120);
                assert_eq!(event.date, NaiveDate::from_ymd_opt(2025, 11, 27).unwrap());
            }
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn event_without_title_uses_default() {
        let intent = only(fr().extract(&monday_request("rdv demain à 9h")));
        assert_eq!(intent.title(), Some(DEFAULT_EVENT_TITLE));
    }

    #[test]
    fn leading_time_and_elision_are_skipped() {
        let intent = only(fr().extract(&monday_request("Rendez-vous à 14h avec le dentiste")));
        assert_eq!(intent.title(), Some("dentiste"));

        let intent = only(fr().extract(&monday_request("Ajoute l'examen d'histoire")));
        assert_eq!(intent.title(), Some("histoire"));
    }

    #[test]
    fn page_without_title_uses_default() {
        let intent = only(fr().extract(&monday_request("nouvelle page")));
        assert_eq!(intent.action(), ActionKind::CreatePage);
        assert_eq!(intent.title(), Some(DEFAULT_PAGE_TITLE));
    }

    #[test]
    fn unmatched_text_falls_back_to_truncated_task() {
        let long = "x".repeat(150);
        let intent = only(fr().extract(&monday_request(&long)));
        match intent {
            Intent::CreateTask(task) => {
                assert_eq!(task.title.chars().count(), FALLBACK_TITLE_CHARS);
                assert_eq!(task.priority, Priority::Medium);
                assert_eq!(task.description.as_deref(), Some(long.as_str()));
            }
            other => panic!("expected fallback task, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_falls_back_with_empty_title() {
        let intent = only(fr().extract(&monday_request("")));
        match intent {
            Intent::CreateTask(task) => {
                assert_eq!(task.title, "");
                assert_eq!(task.description, None);
            }
            other => panic!("expected fallback task, got {other:?}"),
        }
    }

    #[test]
    fn whitespace_input_falls_back_with_empty_title() {
        let intent = only(fr().extract(&monday_request("   ")));
        match intent {
            Intent::CreateTask(task) => {
                assert_eq!(task.title, "");
                assert_eq!(task.description, None);
            }
            other => panic!("expected fallback task, got {other:?}"),
        }

        let intent = only(fr().extract(&monday_request("  bonjour  ")));
        match intent {
            Intent::CreateTask(task) => {
                assert_eq!(task.title, "bonjour");
                assert_eq!(task.description.as_deref(), Some("bonjour"));
            }
            other => panic!("expected fallback task, got {other:?}"),
        }
    }

    #[test]
    fn priority_levels() {
        let x = fr();
        assert_eq!(x.priority("c'est urgent"), Priority::High);
        assert_eq!(x.priority("priorité basse"), Priority::Low);
        assert_eq!(x.priority("low effort"), Priority::Low);
        assert_eq!(x.priority("rien"), Priority::Medium);
        assert_eq!(x.priority("haute mais basse"), Priority::High);
    }

    #[test]
    fn durations() {
        let x = fr();
        assert_eq!(x.duration_minutes("durant 2 heures"), 120);
        assert_eq!(x.duration_minutes("30 min"), 30);
        assert_eq!(x.duration_minutes("45 minutes"), 45);
        assert_eq!(x.duration_minutes("1 heure"), 60);
        assert_eq!(x.duration_minutes("aucune"), DEFAULT_DURATION_MINUTES);
    }

    #[test]
    fn english_meeting() {
        let intent = only(en().extract(&monday_request(
            "Schedule a meeting with Bob on Friday at 3pm for 90 minutes",
        )));
        match intent {
            Intent::CreateEvent(event) => {
                assert_eq!(event.title, "Bob");
                assert_eq!(event.date, NaiveDate::from_ymd_opt(2025, 11, 28).unwrap());
                assert_eq!(event.time, NaiveTime::from_hms_opt(15, 0, 0).unwrap());
                assert_eq!(event.duration_minutes, 90);
            }
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn english_task() {
        let intent = only(en().extract(&monday_request(
            "Add a task to buy groceries tomorrow, low priority",
        )));
        match intent {
            Intent::CreateTask(task) => {
                assert_eq!(task.title, "buy groceries");
                assert_eq!(task.priority, Priority::Low);
                assert_eq!(
                    task.due_date,
                    Some(NaiveDate::from_ymd_opt(2025, 11, 25).unwrap())
                );
            }
            other => panic!("expected task, got {other:?}"),
        }
    }
}
