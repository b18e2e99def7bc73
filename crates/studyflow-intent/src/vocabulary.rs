//! Per-language keyword vocabularies.
//!
//! French is the reference vocabulary.  English follows the same category
//! order and the same rules; only the words differ.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IntentError;

/// Language of the input text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "fr", alias = "french")]
    French,
    #[serde(rename = "en", alias = "english")]
    English,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Self::French => "fr",
            Self::English => "en",
        }
    }

    /// The vocabulary used for this language.
    pub fn vocabulary(self) -> &'static Vocabulary {
        match self {
            Self::French => &FRENCH,
            Self::English => &ENGLISH,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = IntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fr" | "french" | "français" | "francais" => Ok(Self::French),
            "en" | "english" => Ok(Self::English),
            other => Err(IntentError::UnknownLanguage {
                name: other.to_string(),
            }),
        }
    }
}

/// The word lists driving classification and field extraction.
///
/// Category lists double as title anchors and are tried in the order given
/// here.  All entries are lowercase.
#[derive(Debug)]
pub struct Vocabulary {
    pub language: Language,

    // -- Categories ----------------------------------------------------------
    pub event_keywords: &'static [&'static str],
    pub task_keywords: &'static [&'static str],
    pub page_keywords: &'static [&'static str],

    // -- Priority ------------------------------------------------------------
    pub high_priority: &'static [&'static str],
    pub low_priority: &'static [&'static str],

    // -- Dates ---------------------------------------------------------------
    /// Monday first.
    pub weekdays: [&'static str; 7],
    pub tomorrow: &'static [&'static str],
    pub day_after_tomorrow: &'static [&'static str],

    // -- Durations -----------------------------------------------------------
    pub hour_units: &'static [&'static str],
    pub minute_units: &'static [&'static str],

    // -- Titles --------------------------------------------------------------
    /// Words dropped at either end of a title.
    pub fillers: &'static [&'static str],
    /// Elided articles glued to the next word (`d'anglais`).
    pub elisions: &'static [&'static str],
    /// Words that end a title.
    pub connectors: &'static [&'static str],
}

pub static FRENCH: Vocabulary = Vocabulary {
    language: Language::French,
    event_keywords: &[
        "examen",
        "cours",
        "rendez-vous",
        "rdv",
        "réunion",
        "événement",
        "evenement",
        "séance",
    ],
    task_keywords: &[
        "tâche", "tache", "todo", "to-do", "à faire", "ajoute", "ajouter", "crée une",
        "créer une", "cree une",
    ],
    page_keywords: &["page", "note", "document", "notion"],
    high_priority: &["urgent", "important", "haute", "high"],
    low_priority: &["basse", "faible", "low"],
    weekdays: [
        "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
    ],
    tomorrow: &["demain"],
    day_after_tomorrow: &["après-demain", "apres-demain", "après demain", "apres demain"],
    hour_units: &["heures", "heure"],
    minute_units: &["minutes", "minute", "mins", "min"],
    fillers: &[
        "de", "du", "des", "d'", "la", "le", "les", "l'", "un", "une", "pour", "sur", "avec",
        "faire", "notion", ":", "-", "au",
    ],
    elisions: &["d'", "l'", "d’", "l’"],
    connectors: &["à", "a", "et", "durant", "pendant", "avant", "vers"],
};

pub static ENGLISH: Vocabulary = Vocabulary {
    language: Language::English,
    event_keywords: &[
        "exam",
        "class",
        "lecture",
        "appointment",
        "meeting",
        "event",
    ],
    task_keywords: &["task", "todo", "to-do", "add", "create a"],
    page_keywords: &["page", "note", "document", "notion"],
    high_priority: &["urgent", "important", "haute", "high"],
    low_priority: &["basse", "faible", "low"],
    weekdays: [
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
    ],
    tomorrow: &["tomorrow"],
    day_after_tomorrow: &["day after tomorrow"],
    hour_units: &["hours", "hour", "hrs", "hr"],
    minute_units: &["minutes", "minute", "mins", "min"],
    fillers: &[
        "of", "the", "a", "an", "for", "about", "on", "to", "with", "notion", ":", "-",
    ],
    elisions: &[],
    connectors: &["at", "and", "during", "before", "by", "from"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_parses_codes_and_names() {
        assert_eq!("fr".parse::<Language>().unwrap(), Language::French);
        assert_eq!("English".parse::<Language>().unwrap(), Language::English);
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn language_serde_uses_codes() {
        assert_eq!(serde_json::to_string(&Language::French).unwrap(), "\"fr\"");
        let lang: Language = serde_json::from_str("\"english\"").unwrap();
        assert_eq!(lang, Language::English);
    }

    #[test]
    fn vocabularies_are_lowercase() {
        for vocab in [&FRENCH, &ENGLISH] {
            let lists = [
                vocab.event_keywords,
                vocab.task_keywords,
                vocab.page_keywords,
                vocab.high_priority,
                vocab.low_priority,
                vocab.fillers,
                vocab.connectors,
            ];
            for word in lists.iter().flat_map(|l| l.iter()) {
                assert_eq!(*word, word.to_lowercase(), "{:?}", vocab.language);
            }
        }
    }
}
