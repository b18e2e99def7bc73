//! CLI argument definitions for Studyflow.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};

use studyflow_intent::Language;

use crate::helpers::parse_reference_time;

/// Studyflow -- turn study requests into calendar events, tasks and notes.
#[derive(Parser)]
#[command(
    name = "studyflow",
    version,
    about = "Studyflow -- natural-language study planner",
    long_about = "Turns requests such as \"Ajoute un examen de maths mardi à 10h\" into \
                  calendar events, tasks and notes, and dispatches them to the matching \
                  service adapters."
)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(long, short, global = true, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Override the parser language (`fr` or `en`).
    #[arg(long, short, global = true)]
    pub language: Option<Language>,

    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a request and print the resulting intents as JSON.
    Parse {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Parse a request and dispatch the intents to the demo adapters.
    Run {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Read requests from stdin, one per line, until `quit` or `exit`.
    Repl {
        /// Only parse; do not dispatch.
        #[arg(long)]
        parse_only: bool,
    },

    /// Show configuration and adapter health.
    Status,
}

/// Arguments shared by `parse` and `run`.
#[derive(clap::Args)]
pub struct RequestArgs {
    /// The request text; several words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// Reference instant for relative dates (`YYYY-MM-DDTHH:MM[:SS]` or
    /// `YYYY-MM-DD`); defaults to the current local time.
    #[arg(long, value_parser = parse_reference_time)]
    pub now: Option<NaiveDateTime>,

    /// Skip the LLM tier even when configured.
    #[arg(long)]
    pub rules_only: bool,
}

impl RequestArgs {
    pub fn text(&self) -> String {
        self.text.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_joins_words_and_reads_now() {
        let cli = Cli::try_parse_from([
            "studyflow",
            "parse",
            "examen",
            "mardi",
            "--now",
            "2025-11-24T09:00",
        ])
        .unwrap();

        match cli.command {
            Commands::Parse { request } => {
                assert_eq!(request.text(), "examen mardi");
                assert_eq!(
                    request.now.unwrap().format("%Y-%m-%d %H:%M").to_string(),
                    "2025-11-24 09:00"
                );
                assert!(!request.rules_only);
            }
            _ => panic!("expected parse"),
        }
    }

    #[test]
    fn global_options() {
        let cli = Cli::try_parse_from([
            "studyflow",
            "status",
            "--config",
            "other.toml",
            "--language",
            "en",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert_eq!(cli.language, Some(Language::English));
    }

    #[test]
    fn parse_requires_text() {
        assert!(Cli::try_parse_from(["studyflow", "parse"]).is_err());
        assert!(Cli::try_parse_from(["studyflow", "run", "x", "--now", "demain"]).is_err());
    }
}
