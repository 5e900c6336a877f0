// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Completion API client (OpenAI chat completions).
//!
//! Transport and provider failures are logged in full but surfaced to the
//! UI as a single generic message.

use crate::config::Config;
use crate::error::AppError;
use crate::models::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message shown when the completion call fails for any reason.
pub const COMPLETION_FAILURE: &str =
    "Failed to communicate with the virtual mentor. Please try again.";

/// Reply used when the provider answers without any text.
pub const EMPTY_REPLY_FALLBACK: &str = "Sorry, I couldn't generate a response.";

/// Suggestions returned when the provider cannot be reached.
pub const FALLBACK_SUGGESTIONS: [&str; 3] = [
    "Explore the available content",
    "Practice regularly",
    "Set specific goals",
];

const SUGGESTIONS_PROMPT: &str =
    "You are a mentor who generates personalized learning suggestions.";
const SUGGESTIONS_MAX_TOKENS: u32 = 200;

/// A completion request. Unset knobs fall back to the client defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }
}

/// Generates the next assistant turn for a conversation.
#[async_trait]
pub trait CompletionApi: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError>;
}

/// OpenAI chat completions client.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    default_max_tokens: u32,
    default_temperature: f32,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            default_max_tokens: 500,
            default_temperature: 0.7,
        }
    }

    /// Build a client from the completion section of the config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
            config.openai_model.clone(),
        )
        .with_defaults(config.completion_max_tokens, config.completion_temperature)
    }

    pub fn with_defaults(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.default_max_tokens = max_tokens;
        self.default_temperature = temperature;
        self
    }

    async fn request_completion(&self, request: &CompletionRequest) -> anyhow::Result<String> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: &request.messages,
            max_tokens: request.max_tokens.unwrap_or(self.default_max_tokens),
            temperature: request.temperature.unwrap_or(self.default_temperature),
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error {}: {}", status, text);
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        Ok(reply_text(parsed))
    }
}

#[async_trait]
impl CompletionApi for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError> {
        tracing::debug!(
            model = %self.model,
            messages = request.messages.len(),
            "Requesting completion"
        );

        self.request_completion(&request).await.map_err(|e| {
            tracing::error!(error = %e, "Completion request failed");
            AppError::Completion(COMPLETION_FAILURE.to_string())
        })
    }
}

/// First choice's text, or the fallback reply when there is none.
fn reply_text(response: ChatCompletionResponse) -> String {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.is_empty())
        .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string())
}

/// Ask for three learning suggestions tailored to `user_context`.
///
/// Never fails: provider errors yield [`FALLBACK_SUGGESTIONS`].
pub async fn generate_suggestions(api: &dyn CompletionApi, user_context: &str) -> Vec<String> {
    let request = CompletionRequest {
        messages: vec![
            Message::system(SUGGESTIONS_PROMPT),
            Message::user(format!(
                "Based on the following user context, \
                 generate 3 learning suggestions separated by \"|\": {}",
                user_context
            )),
        ],
        max_tokens: Some(SUGGESTIONS_MAX_TOKENS),
        temperature: None,
    };

    match api.complete(request).await {
        Ok(text) => parse_suggestions(&text),
        Err(e) => {
            tracing::warn!(error = %e, "Falling back to default suggestions");
            FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
        }
    }
}

/// Split a `|`-separated reply into trimmed, non-empty suggestions.
pub fn parse_suggestions(text: &str) -> Vec<String> {
    text.split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
