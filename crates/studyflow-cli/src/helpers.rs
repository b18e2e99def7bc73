//! Shared helper functions used across CLI subcommands.
//!
//! Includes tracing initialization, reference-time parsing and construction
//! of the intent parser from configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use studyflow_agent::LlmClient;
use studyflow_intent::{IntentParser, LlmExtractor};

use crate::config::{ParserMode, StudyflowConfig};

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber with the given default log level.
///
/// Logs go to stderr so that JSON on stdout stays machine-readable.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Read a non-empty environment variable, returning `None` if unset or empty.
pub fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Reference time
// ---------------------------------------------------------------------------

/// Parse a `--now` value: `YYYY-MM-DDTHH:MM[:SS]`, the same with a space,
/// or a bare `YYYY-MM-DD` (midnight).
pub fn parse_reference_time(raw: &str) -> std::result::Result<NaiveDateTime, String> {
    let raw = raw.trim();
    for format in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(instant) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(instant);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("invalid reference time `{raw}` (expected YYYY-MM-DDTHH:MM)"))
}

// ---------------------------------------------------------------------------
// Parser construction
// ---------------------------------------------------------------------------

/// Build the intent parser described by `config`.
///
/// In `llm` mode a missing API key or an unusable client configuration is
/// logged and the parser runs rules-only.
pub fn build_parser(config: &StudyflowConfig, rules_only: bool) -> Result<IntentParser> {
    let parser = IntentParser::new(config.parser.language)
        .context("failed to build rule-based extractor")?;

    if rules_only || config.parser.mode == ParserMode::Rules {
        info!(language = %config.parser.language, "parser ready (rules)");
        return Ok(parser);
    }

    let Some(api_key) = config.api_key(env_non_empty) else {
        warn!(
            env = %config.llm.api_key_env,
            "llm mode selected but no API key found, using rules only"
        );
        return Ok(parser);
    };

    let client = match config
        .llm
        .client_config(api_key)
        .and_then(|cfg| LlmClient::new(cfg).context("failed to create LLM client"))
    {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "LLM tier unavailable, using rules only");
            return Ok(parser);
        }
    };

    let extractor = LlmExtractor::new(Arc::new(client))
        .with_temperature(config.llm.temperature)
        .with_max_tokens(config.llm.max_tokens);

    info!(
        language = %config.parser.language,
        provider = %config.llm.provider,
        model = %extractor.model(),
        "parser ready (llm with rules fallback)"
    );
    Ok(parser.with_strategy(Arc::new(extractor)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_time_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 11, 24)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_reference_time("2025-11-24T09:30").unwrap(), expected);
        assert_eq!(parse_reference_time("2025-11-24T09:30:00").unwrap(), expected);
        assert_eq!(parse_reference_time("2025-11-24 09:30").unwrap(), expected);

        let midnight = parse_reference_time("2025-11-24").unwrap();
        assert_eq!(midnight.format("%H:%M").to_string(), "00:00");

        assert!(parse_reference_time("mardi").is_err());
    }

    #[test]
    fn rules_mode_builds_rules_parser() {
        let config = StudyflowConfig::default();
        let parser = build_parser(&config, false).unwrap();
        assert_eq!(parser.strategy_name(), "rules");
    }

    #[test]
    fn rules_only_flag_skips_llm_tier() {
        let mut config = StudyflowConfig::default();
        config.parser.mode = ParserMode::Llm;
        let parser = build_parser(&config, true).unwrap();
        assert_eq!(parser.strategy_name(), "rules");
    }
}
