//! Multi-provider LLM client.
//!
//! Supports the **Anthropic Messages API** and the **OpenAI Chat Completions
//! API**, including OpenAI-compatible gateways such as OpenRouter, Ollama and
//! vLLM.  Only non-streaming requests are issued: intent parsing needs the
//! whole JSON reply before it can do anything with it.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::{Value, json};

use crate::error::{AgentError, Result};
use crate::llm::types::{ChatRequest, ChatResponse, Message, Role, Usage};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default Anthropic API base URL.
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// Default OpenAI API base URL.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenRouter API base URL (OpenAI-compatible).
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Provider enum
// ---------------------------------------------------------------------------

/// Identifies which LLM provider the client should target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Anthropic Messages API.
    Anthropic,
    /// OpenAI Chat Completions API (also covers OpenAI-compatible endpoints).
    OpenAI,
}

impl LlmProvider {
    fn name(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAI => "openai",
        }
    }
}

// ---------------------------------------------------------------------------
// Client configuration
// ---------------------------------------------------------------------------

/// Configuration for connecting to a single LLM provider endpoint.
#[derive(Debug, Clone)]
pub struct LlmClientConfig {
    /// Which provider this configuration targets.
    pub provider: LlmProvider,
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Default model identifier.
    pub default_model: String,
    /// Default maximum tokens per response.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Additional headers sent with every request (e.g. OpenRouter's
    /// `HTTP-Referer` and `X-Title` attribution headers).
    pub extra_headers: Vec<(String, String)>,
}

impl LlmClientConfig {
    /// Create a configuration for the Anthropic Claude API.
    pub fn anthropic(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_provider(LlmProvider::Anthropic, api_key, model, ANTHROPIC_BASE_URL)
    }

    /// Create a configuration for the OpenAI API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_provider(LlmProvider::OpenAI, api_key, model, OPENAI_BASE_URL)
    }

    /// Create a configuration for OpenRouter.
    pub fn openrouter(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_provider(LlmProvider::OpenAI, api_key, model, OPENROUTER_BASE_URL)
    }

    /// Create a configuration for any OpenAI-compatible API.
    pub fn openai_compatible(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self::with_provider(LlmProvider::OpenAI, api_key, model, base_url)
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    fn with_provider(
        provider: LlmProvider,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            base_url: base_url.into(),
            default_model: model.into(),
            max_tokens: 1024,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            extra_headers: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// An LLM client that communicates with either the Anthropic Messages API or
/// the OpenAI Chat Completions API.
///
/// Cheap to clone: the configuration is shared and `reqwest::Client` is
/// reference-counted internally.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: Arc<LlmClientConfig>,
    http: reqwest::Client,
}

impl LlmClient {
    /// Create a new client with the given configuration.
    pub fn new(config: LlmClientConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(AgentError::MissingApiKey {
                provider: config.provider.name().into(),
            });
        }

        // Validate extra headers once so request building cannot fail on them.
        for (name, value) in &config.extra_headers {
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| AgentError::ConfigError {
                reason: format!("invalid header name `{name}`: {e}"),
            })?;
            HeaderValue::from_str(value).map_err(|e| AgentError::ConfigError {
                reason: format!("invalid value for header `{name}`: {e}"),
            })?;
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::LlmRequestFailed {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// Returns the configured provider.
    pub fn provider(&self) -> LlmProvider {
        self.config.provider
    }

    /// Returns the default model identifier.
    pub fn default_model(&self) -> &str {
        &self.config.default_model
    }

    // -----------------------------------------------------------------------
    // Public API
    // -----------------------------------------------------------------------

    /// Send a chat request and return the full text reply.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let (url, headers, body) = match self.config.provider {
            LlmProvider::Anthropic => (
                format!("{}/v1/messages", self.config.base_url),
                self.anthropic_headers()?,
                self.build_anthropic_request_body(request),
            ),
            LlmProvider::OpenAI => (
                format!("{}/chat/completions", self.config.base_url),
                self.openai_headers()?,
                self.build_openai_request_body(request),
            ),
        };

        tracing::debug!(
            url = %url,
            model = %body["model"],
            provider = self.config.provider.name(),
            "sending LLM request"
        );

        let resp = self
            .http
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| AgentError::LlmRequestFailed {
                reason: format!("failed to read response body: {e}"),
            })?;

        if !status.is_success() {
            return Err(AgentError::LlmRequestFailed {
                reason: format!("API returned {status}: {text}"),
            });
        }

        let v: Value = serde_json::from_str(&text).map_err(|e| AgentError::LlmParseFailed {
            reason: format!("invalid JSON response: {e}"),
        })?;

        match self.config.provider {
            LlmProvider::Anthropic => parse_anthropic_response(&v),
            LlmProvider::OpenAI => parse_openai_response(&v),
        }
    }

    // -- Request building ----------------------------------------------------

    fn model_for<'a>(&'a self, request: &'a ChatRequest) -> &'a str {
        if request.model.is_empty() {
            &self.config.default_model
        } else {
            &request.model
        }
    }

    /// Build the JSON body for the Anthropic Messages API.
    fn build_anthropic_request_body(&self, request: &ChatRequest) -> Value {
        let (system_text, messages) = messages_to_anthropic(&request.messages);

        let mut body = json!({
            "model": self.model_for(request),
            "max_tokens": request.max_tokens.unwrap_or(self.config.max_tokens),
            "messages": messages,
        });

        if let Some(system) = system_text {
            body["system"] = json!(system);
        }

        if let Some(temp) = request.temperature {
            body["temperature"] = json!(temp);
        }

        body
    }

    /// Build the JSON body for the OpenAI Chat Completions API.
    fn build_openai_request_body(&self, request: &ChatRequest) -> Value {
        let mut body = json!({
            "model": self.model_for(request),
            "max_tokens": request.max_tokens.unwrap_or(self.config.max_tokens),
            "messages": messages_to_openai(&request.messages),
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = json!(temp);
        }

        body
    }

    // -- Headers -------------------------------------------------------------

    fn anthropic_headers(&self) -> Result<HeaderMap> {
        let mut headers = self.base_headers()?;
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.config.api_key).map_err(|e| {
                AgentError::LlmRequestFailed {
                    reason: format!("invalid API key header: {e}"),
                }
            })?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        Ok(headers)
    }

    fn openai_headers(&self) -> Result<HeaderMap> {
        let mut headers = self.base_headers()?;
        let auth_value = format!("Bearer {}", self.config.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value).map_err(|e| AgentError::LlmRequestFailed {
                reason: format!("invalid authorization header: {e}"),
            })?,
        );
        Ok(headers)
    }

    fn base_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &self.config.extra_headers {
            let name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| AgentError::ConfigError {
                    reason: format!("invalid header name `{name}`: {e}"),
                })?;
            let value = HeaderValue::from_str(value).map_err(|e| AgentError::ConfigError {
                reason: format!("invalid header value: {e}"),
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

// ===========================================================================
// Anthropic format conversion (free functions)
// ===========================================================================

/// Split the system message out (Anthropic expects it as a top-level field,
/// not in the `messages` array) and convert the remaining messages to the
/// Anthropic wire format.
fn messages_to_anthropic(messages: &[Message]) -> (Option<String>, Vec<Value>) {
    let mut system: Option<String> = None;
    let mut wire_messages: Vec<Value> = Vec::with_capacity(messages.len());

    for msg in messages {
        match msg.role {
            Role::System => match &mut system {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(&msg.content);
                }
                None => {
                    system = Some(msg.content.clone());
                }
            },
            Role::User => wire_messages.push(json!({
                "role": "user",
                "content": msg.content,
            })),
            Role::Assistant => wire_messages.push(json!({
                "role": "assistant",
                "content": msg.content,
            })),
        }
    }

    (system, wire_messages)
}

/// Parse a non-streaming Anthropic Messages API response.
fn parse_anthropic_response(v: &Value) -> Result<ChatResponse> {
    let content = v["content"]
        .as_array()
        .ok_or_else(|| AgentError::LlmParseFailed {
            reason: "missing `content` array in response".into(),
        })?;

    let text = content
        .iter()
        .filter(|block| block["type"] == "text")
        .filter_map(|block| block["text"].as_str())
        .collect::<Vec<_>>()
        .join("");

    let usage = Usage {
        input_tokens: token_count(&v["usage"]["input_tokens"]),
        output_tokens: token_count(&v["usage"]["output_tokens"]),
    };

    Ok(ChatResponse { text, usage })
}

// ===========================================================================
// OpenAI format conversion (free functions)
// ===========================================================================

/// Convert internal messages to the OpenAI Chat Completions wire format.
pub fn messages_to_openai(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|msg| {
            let role = match msg.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            json!({
                "role": role,
                "content": msg.content,
            })
        })
        .collect()
}

/// Parse a non-streaming OpenAI Chat Completions API response.
pub fn parse_openai_response(v: &Value) -> Result<ChatResponse> {
    let message = &v["choices"][0]["message"];

    if message.is_null() {
        return Err(AgentError::LlmParseFailed {
            reason: "missing `choices[0].message` in response".into(),
        });
    }

    let text = message["content"].as_str().unwrap_or_default().to_owned();
    let usage = Usage {
        input_tokens: token_count(&v["usage"]["prompt_tokens"]),
        output_tokens: token_count(&v["usage"]["completion_tokens"]),
    };

    Ok(ChatResponse { text, usage })
}

fn token_count(v: &Value) -> u32 {
    v.as_u64()
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn request(messages: Vec<Message>) -> ChatRequest {
        ChatRequest {
            model: String::new(),
            messages,
            temperature: Some(0.3),
            max_tokens: Some(512),
        }
    }

    #[test]
    fn build_anthropic_request_body_basic() {
        let config = LlmClientConfig::anthropic("test-key", "claude-sonnet-4-20250514");
        let client = LlmClient::new(config).unwrap();

        let body = client.build_anthropic_request_body(&request(vec![
            Message::system("You are an intent parser."),
            Message::user("Ajoute un examen"),
        ]));

        assert_eq!(body["model"], "claude-sonnet-4-20250514");
        assert_eq!(body["system"], "You are an intent parser.");
        assert_eq!(body["max_tokens"], 512);
        let temp = body["temperature"].as_f64().unwrap();
        assert!((temp - 0.3).abs() < 1e-6, "temperature was {temp}");

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "Ajoute un examen");
    }

    #[test]
    fn build_openai_request_body_keeps_system_in_messages() {
        let config = LlmClientConfig::openrouter("sk-or-test", "meta-llama/llama-3.1-8b-instruct");
        let client = LlmClient::new(config).unwrap();

        let mut req = request(vec![Message::system("sys"), Message::user("hello")]);
        req.model = "other/model".into();
        let body = client.build_openai_request_body(&req);

        assert_eq!(body["model"], "other/model");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], "hello");
    }

    #[test]
    fn empty_api_key_returns_error() {
        let config = LlmClientConfig::anthropic("", "claude-sonnet-4-20250514");
        let result = LlmClient::new(config);
        assert!(matches!(result, Err(AgentError::MissingApiKey { .. })));
    }

    #[test]
    fn invalid_extra_header_is_rejected() {
        let config = LlmClientConfig::openrouter("key", "model").with_header("bad header", "x");
        assert!(matches!(
            LlmClient::new(config),
            Err(AgentError::ConfigError { .. })
        ));
    }

    #[test]
    fn openrouter_config_construction() {
        let config = LlmClientConfig::openrouter("sk-or", "meta-llama/llama-3.1-8b-instruct")
            .with_header("X-Title", "Studyflow");
        assert_eq!(config.provider, LlmProvider::OpenAI);
        assert_eq!(config.base_url, OPENROUTER_BASE_URL);
        assert_eq!(config.extra_headers.len(), 1);

        let client = LlmClient::new(config).unwrap();
        let headers = client.openai_headers().unwrap();
        assert_eq!(headers["x-title"], "Studyflow");
        assert_eq!(headers[AUTHORIZATION], "Bearer sk-or");
    }

    #[test]
    fn parse_non_streaming_anthropic_text_response() {
        let response_json = json!({
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "{\"tasks\": "},
                {"type": "text", "text": "[]}"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        });

        let result = parse_anthropic_response(&response_json).unwrap();
        assert_eq!(result.text, "{\"tasks\": []}");
        assert_eq!(result.usage.input_tokens, 10);
        assert_eq!(result.usage.output_tokens, 5);
    }

    #[test]
    fn parse_anthropic_response_without_content_fails() {
        let result = parse_anthropic_response(&json!({"type": "error"}));
        assert!(matches!(result, Err(AgentError::LlmParseFailed { .. })));
    }

    #[test]
    fn parse_openai_text_response() {
        let response_json = json!({
            "id": "chatcmpl-abc",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Hello from OpenRouter!"
                },
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        });

        let result = parse_openai_response(&response_json).unwrap();
        assert_eq!(result.text, "Hello from OpenRouter!");
        assert_eq!(result.usage.output_tokens, 5);
    }

    #[test]
    fn parse_openai_response_without_choices_fails() {
        let result = parse_openai_response(&json!({"error": {"message": "rate limited"}}));
        assert!(result.is_err());
    }

    #[test]
    fn messages_to_openai_roles() {
        let wire = messages_to_openai(&[
            Message::system("s"),
            Message::user("u"),
            Message::assistant("a"),
        ]);
        let roles: Vec<_> = wire.iter().map(|m| m["role"].as_str().unwrap()).collect();
        assert_eq!(roles, ["system", "user", "assistant"]);
    }
}
