//! Date and time resolution against a reference instant.
//!
//! Dates, first rule that applies:
//!
//! 1. a weekday name: its next occurrence strictly after today
//! 2. "day after tomorrow": today + 2
//! 3. "tomorrow": today + 1
//! 4. nothing: today + 1
//!
//! The day-after phrase is tested before "tomorrow" because it contains it
//! (`après-demain`, `day after tomorrow`).
//!
//! Times: the first `<h>h<mm>` / `<h>:<mm>` / `<h>pm` with a valid hour and
//! minute, else 10:00.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::keywords::{KeywordSet, compile};
use crate::vocabulary::Vocabulary;

/// Vocabulary weekday order.
const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

const TIME_PATTERN: &str =
    r"(?i)(?:^|\D)(\d{1,2})(?:[:h](\d{2})?(?:\s?([ap]m)\b)?|\s?([ap]m)\b)";

/// A resolved calendar date and clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDateTime {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Resolves relative date words and clock times.
///
/// Stateless after construction; every method is a pure function of its
/// arguments.
#[derive(Debug, Clone)]
pub struct DateTimeResolver {
    weekdays: KeywordSet,
    day_after_tomorrow: KeywordSet,
    tomorrow: KeywordSet,
    time: Regex,
}

impl DateTimeResolver {
    pub fn new(vocabulary: &Vocabulary) -> Result<Self> {
        Ok(Self {
            weekdays: KeywordSet::new(&vocabulary.weekdays)?,
            day_after_tomorrow: KeywordSet::new(vocabulary.day_after_tomorrow)?,
            tomorrow: KeywordSet::new(vocabulary.tomorrow)?,
            time: compile(TIME_PATTERN.to_string())?,
        })
    }

    /// Resolve both the date and the time mentioned in `text`.
    pub fn resolve(&self, text: &str, now: NaiveDateTime) -> ResolvedDateTime {
        ResolvedDateTime {
            date: self.resolve_date(text, now.date()),
            time: self.resolve_time(text),
        }
    }

    /// The date mentioned in `text`, defaulting to tomorrow.
    pub fn resolve_date(&self, text: &str, today: NaiveDate) -> NaiveDate {
        self.explicit_date(text, today)
            .unwrap_or_else(|| add_days(today, 1))
    }

    /// The date mentioned in `text`, or `None` when it names no weekday and
    /// no relative day.
    pub fn explicit_date(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        let lowered = text.to_lowercase();

        if let Some(index) = self.weekdays.find(&lowered) {
            let target = WEEKDAYS[index];
            let date = next_weekday(today, target);
            tracing::trace!(weekday = ?target, %date, "weekday resolved");
            return Some(date);
        }

        if self.day_after_tomorrow.contains_any(&lowered) {
            return Some(add_days(today, 2));
        }

        if self.tomorrow.contains_any(&lowered) {
            return Some(add_days(today, 1));
        }

        None
    }

    /// The first valid clock time in `text`, defaulting to 10:00.
    pub fn resolve_time(&self, text: &str) -> NaiveTime {
        self.time
            .captures_iter(text)
            .find_map(|caps| {
                let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
                let minute: u32 = match caps.get(2) {
                    Some(m) => m.as_str().parse().ok()?,
                    None => 0,
                };
                let meridiem = caps.get(3).or_else(|| caps.get(4)).map(|m| m.as_str());
                let hour = match meridiem {
                    Some(m) => to_24h(hour, m)?,
                    None => hour,
                };
                NaiveTime::from_hms_opt(hour, minute, 0)
            })
            .unwrap_or_else(default_time)
    }
}

/// The next `target` strictly after `today`: the same weekday rolls over to
/// a week later.
pub fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let current = today.weekday().num_days_from_monday();
    let wanted = target.num_days_from_monday();
    let ahead = (wanted + 7 - current) % 7;
    add_days(today, if ahead == 0 { 7 } else { u64::from(ahead) })
}

/// 10:00.
pub fn default_time() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

fn to_24h(hour: u32, meridiem: &str) -> Option<u32> {
    if !(1..=12).contains(&hour) {
        return None;
    }
    if meridiem.eq_ignore_ascii_case("pm") {
        Some(hour % 12 + 12)
    } else {
        Some(hour % 12)
    }
}
