//! Configuration loading.
//!
//! The TOML file (default `config/default.toml`) supplies base values; a
//! missing file means built-in defaults.  Environment variables then
//! override single keys:
//!
//! - `STUDYFLOW_PARSER_MODE` -> `parser.mode`
//! - `STUDYFLOW_LANGUAGE` -> `parser.language`
//! - `STUDYFLOW_LLM_MODEL` -> `llm.model`
//! - `STUDYFLOW_LLM_BASE_URL` -> `llm.base_url`
//!
//! The API key itself never lives in the file: it is read from the variable
//! named by `llm.api_key_env`, then from `META_API_KEY`.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use studyflow_agent::LlmClientConfig;
use studyflow_intent::Language;

use crate::helpers::env_non_empty;

/// Older deployments keep the OpenRouter key here.
pub const LEGACY_API_KEY_ENV: &str = "META_API_KEY";

const DEFAULT_PROVIDER: &str = "openrouter";
const DEFAULT_MODEL: &str = "meta-llama/llama-3.1-8b-instruct";
const DEFAULT_API_KEY_ENV: &str = "LLM_API_KEY";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which tier the parser prefers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserMode {
    #[default]
    Rules,
    Llm,
}

impl FromStr for ParserMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rules" | "mock" => Ok(Self::Rules),
            "llm" => Ok(Self::Llm),
            other => bail!("unknown parser mode `{other}` (expected `rules` or `llm`)"),
        }
    }
}

impl std::fmt::Display for ParserMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rules => write!(f, "rules"),
            Self::Llm => write!(f, "llm"),
        }
    }
}

/// `[parser]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub mode: ParserMode,
    pub language: Language,
}

/// `[llm]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// `openrouter`, `openai`, `anthropic`, or any other name for an
    /// OpenAI-compatible endpoint at `base_url`.
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.into(),
            model: DEFAULT_MODEL.into(),
            base_url: None,
            api_key_env: DEFAULT_API_KEY_ENV.into(),
            temperature: studyflow_intent::llm::DEFAULT_TEMPERATURE,
            max_tokens: studyflow_intent::llm::DEFAULT_MAX_TOKENS,
        }
    }
}

impl LlmConfig {
    /// Client settings for this section with the given key.
    pub fn client_config(&self, api_key: String) -> Result<LlmClientConfig> {
        let provider = self.provider.to_lowercase();
        let mut config = match provider.as_str() {
            "openrouter" => LlmClientConfig::openrouter(api_key, self.model.clone())
                .with_header("HTTP-Referer", "http://localhost")
                .with_header("X-Title", "Studyflow"),
            "openai" => LlmClientConfig::openai(api_key, self.model.clone()),
            "anthropic" => LlmClientConfig::anthropic(api_key, self.model.clone()),
            other => {
                let base_url = self
                    .base_url
                    .clone()
                    .with_context(|| format!("provider `{other}` requires llm.base_url"))?;
                LlmClientConfig::openai_compatible(api_key, self.model.clone(), base_url)
            }
        };

        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        config.max_tokens = self.max_tokens;
        Ok(config)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyflowConfig {
    pub parser: ParserConfig,
    pub llm: LlmConfig,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl StudyflowConfig {
    /// Load `path` and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env(env_non_empty)?;
        debug!(
            mode = %config.parser.mode,
            language = %config.parser.language,
            model = %config.llm.model,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Read `path`, or return defaults when it does not exist.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Apply `STUDYFLOW_*` overrides looked up through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(mode) = lookup("STUDYFLOW_PARSER_MODE") {
            self.parser.mode = mode.parse()?;
        }
        if let Some(language) = lookup("STUDYFLOW_LANGUAGE") {
            self.parser.language = language.parse()?;
        }
        if let Some(model) = lookup("STUDYFLOW_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(url) = lookup("STUDYFLOW_LLM_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        Ok(())
    }

    /// The LLM API key, if one is set.
    pub fn api_key(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        lookup(&self.llm.api_key_env).or_else(|| lookup(LEGACY_API_KEY_ENV))
    }
}
