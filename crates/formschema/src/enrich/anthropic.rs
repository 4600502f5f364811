//! Anthropic Messages API enricher.

use std::time::Duration;

use formschema_core::EnrichedField;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::prompt::{build_prompt, parse_reply};
use super::{EnrichError, EnrichmentRequest, FieldEnricher};

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

/// Connection settings for [`AnthropicEnricher`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    /// Per-request timeout; expiry is a retryable failure.
    pub timeout: Duration,
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: 1024,
            timeout: Duration::from_secs(60),
        }
    }

    /// Read the key from `ANTHROPIC_API_KEY`.
    pub fn from_env() -> Result<Self, EnrichError> {
        match std::env::var("ANTHROPIC_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            _ => Err(EnrichError::MissingApiKey),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a custom base URL (for proxies or alternative endpoints)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Enriches fields by asking a Claude model to describe them.
#[derive(Debug, Clone)]
pub struct AnthropicEnricher {
    config: AnthropicConfig,
    client: reqwest::blocking::Client,
}

impl AnthropicEnricher {
    pub fn new(config: AnthropicConfig) -> Result<Self, EnrichError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EnrichError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Build from `ANTHROPIC_API_KEY` with default settings.
    pub fn from_env() -> Result<Self, EnrichError> {
        Self::new(AnthropicConfig::from_env()?)
    }

    pub fn config(&self) -> &AnthropicConfig {
        &self.config
    }
}

/// Map a non-success HTTP status onto the failure taxonomy.
pub(crate) fn status_error(status: u16, body: &str) -> EnrichError {
    let detail = format!("HTTP {status}: {}", body.trim());
    match status {
        429 | 529 => EnrichError::RateLimited(detail),
        408 | 504 => EnrichError::Timeout(detail),
        _ => EnrichError::Request(detail),
    }
}

fn transport_error(err: &reqwest::Error) -> EnrichError {
    if err.is_timeout() {
        EnrichError::Timeout(err.to_string())
    } else {
        EnrichError::Request(err.to_string())
    }
}

impl FieldEnricher for AnthropicEnricher {
    fn enrich(&self, request: &EnrichmentRequest<'_>) -> Result<EnrichedField, EnrichError> {
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user",
                content: build_prompt(request),
            }],
        };

        let response = self
            .client
            .post(format!("{}/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(status_error(status.as_u16(), &text));
        }

        let reply: MessagesResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                transport_error(&e)
            } else {
                EnrichError::InvalidResponse(format!("failed to parse API response: {e}"))
            }
        })?;
        let text: String = reply.content.into_iter().map(|block| block.text).collect();
        debug!(field = request.field_name, reply = %text, "model reply");
        parse_reply(&text)
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
