//! OpenAI-compatible chat-completions client.
//!
//! Sends the summarization prompt as the user message, preceded by the
//! system instruction from [`CompletionSettings`]. Any endpoint that speaks
//! the `/chat/completions` wire format works (set `OPENAI_BASE_URL`).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CompletionClient, CompletionError, CompletionSettings};
use crate::config::OpenAiConfig;

/// Request body for the chat-completions API.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from the chat-completions API. Only the fields we read.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    /// Trimmed content of the first choice.
    fn into_content(self) -> Result<String, CompletionError> {
        let content = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            Err(CompletionError::EmptyCompletion)
        } else {
            Ok(content)
        }
    }
}

/// Chat-completions provider.
///
/// The inner `reqwest::Client` pools connections; build one instance at
/// startup and share it.
#[derive(Debug, Clone)]
pub struct OpenAiCompletionClient {
    client: reqwest::Client,
    config: OpenAiConfig,
    settings: CompletionSettings,
}

impl OpenAiCompletionClient {
    /// Create a client with default generation settings.
    pub fn new(config: OpenAiConfig) -> Result<Self, CompletionError> {
        Self::with_settings(config, CompletionSettings::default())
    }

    /// Create a client with explicit generation settings.
    pub fn with_settings(
        config: OpenAiConfig,
        settings: CompletionSettings,
    ) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CompletionError::Communication(e.to_string()))?;

        Ok(Self {
            client,
            config,
            settings,
        })
    }

    /// Model identifier in use.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.settings.system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| CompletionError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            CompletionError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        parsed.into_content()
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}
