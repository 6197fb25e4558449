#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finsight/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! OpenAI narrative service.
//!
//! [`OpenAiNarrator`] implements [`NarrativeService`] over the OpenAI
//! chat-completions API. Each call sends one system message and the
//! request's rendered prompt and returns the first choice's content.
//!
//! # Usage
//!
//! ```rust,ignore
//! use finsight_openai::OpenAiNarrator;
//!
//! let narrator = OpenAiNarrator::new("sk-...").with_model("gpt-4o-mini");
//! let text = narrator.generate(&request).await?;
//! ```

use async_trait::async_trait;
use finsight_core::{InsightError, NarrativeRequest, NarrativeService, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Service name used in errors and logs.
pub const SERVICE_NAME: &str = "OpenAI";

/// Base URL for the OpenAI API.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Sampling temperature used when none is configured.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

const SYSTEM_PROMPT: &str = "You are a financial analyst. Using only the figures provided, \
write a concise assessment (at most two short paragraphs) for an investor. \
Do not invent numbers; say so when a figure is not reported.";

/// Narrative service backed by OpenAI chat completions.
#[derive(Clone)]
pub struct OpenAiNarrator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
}

impl fmt::Debug for OpenAiNarrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiNarrator")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiNarrator {
    /// Create a narrator with the given API key and default model.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_key)
    }

    /// Create a narrator with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: OPENAI_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Set the chat model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API base URL (for compatible gateways).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Returns the configured model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        }
    }
}

/// Maps a non-success HTTP status to an error.
fn status_error(status: StatusCode, body: &str) -> InsightError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        StatusCode::UNAUTHORIZED => InsightError::AuthenticationFailed(SERVICE_NAME.to_string()),
        StatusCode::TOO_MANY_REQUESTS => InsightError::RateLimited {
            provider: SERVICE_NAME.to_string(),
            message,
        },
        _ => InsightError::Narrative(format!("HTTP {status}: {message}")),
    }
}

/// Extracts the first choice's text.
fn completion_text(response: ChatResponse) -> Result<String> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        return Err(InsightError::EmptyNarrative);
    }
    Ok(text.to_string())
}

#[async_trait]
impl NarrativeService for OpenAiNarrator {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn generate(&self, request: &NarrativeRequest) -> Result<String> {
        let prompt = request.prompt();
        debug!(
            service = SERVICE_NAME,
            model = %self.model,
            symbol = %request.symbol,
            category = %request.category,
            "Requesting narrative"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.body(&prompt))
            .send()
            .await
            .map_err(|e| InsightError::Narrative(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| InsightError::Narrative(e.to_string()))?;
        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| InsightError::Parse(format!("{e}: {text}")))?;
        completion_text(parsed)
    }
}

// ============================================================================
// Chat Completions Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}
