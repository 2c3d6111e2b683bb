//! Summarizer gateway.
//!
//! Wraps a single external text-completion call behind
//! [`Summarizer::summarize`]. The gateway owns prompt construction and
//! response validation; callers only ever see [`SnippetError::Upstream`]
//! when the provider fails, never the provider's own error shape.
//!
//! # Providers
//!
//! - `MockCompletionClient`: deterministic, offline; used in tests and when no
//!   provider credential is configured
//! - `OpenAiCompletionClient`: chat-completions over HTTP (feature `openai`)

pub mod mock;

#[cfg(feature = "openai")]
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SnippetError;

pub use mock::MockCompletionClient;

#[cfg(feature = "openai")]
pub use openai::OpenAiCompletionClient;

/// Instruction prepended to every snippet before it is sent to the provider.
pub const SUMMARY_PROMPT_PREFIX: &str = "Summarize the following text in 30 words or less: ";

/// Errors raised by a completion provider.
///
/// These stay inside the gateway; [`Summarizer`] collapses all of them
/// into [`SnippetError::Upstream`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    /// Network or transport failure.
    #[error("Communication error: {0}")]
    Communication(String),

    /// Provider answered with a non-success status.
    #[error("Provider returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// Provider answered with a body we could not read.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider answered without any completion text.
    #[error("Provider returned an empty completion")]
    EmptyCompletion,
}

/// Generation parameters sent with every completion request.
///
/// Low temperature favors consistent summaries; `max_tokens` bounds the
/// output length.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    /// System message framing the task.
    pub system_instruction: String,
    /// Output-length ceiling.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            system_instruction: "You are a helpful assistant that creates concise summaries. \
                                 Always respond with summaries of 30 words or less."
                .to_string(),
            max_tokens: 100,
            temperature: 0.3,
        }
    }
}

/// A prompt-in/text-out completion provider.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete `prompt` and return the raw completion text.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;

    /// Provider name for logs.
    fn provider_name(&self) -> &str;
}

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for Arc<T> {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        (**self).complete(prompt).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }
}

/// Build the summarization prompt for `text`. The text is embedded verbatim.
pub fn build_prompt(text: &str) -> String {
    format!("{SUMMARY_PROMPT_PREFIX}{text}")
}

/// Stable `summarize(text) -> String` contract over a completion provider.
#[derive(Debug, Clone)]
pub struct Summarizer<C: CompletionClient> {
    client: C,
}

impl<C: CompletionClient> Summarizer<C> {
    /// Create a summarizer over the given provider.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// The underlying provider.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Summarize `text`.
    ///
    /// # Errors
    ///
    /// Returns [`SnippetError::Upstream`] if the provider fails or returns
    /// an empty completion.
    pub async fn summarize(&self, text: &str) -> Result<String, SnippetError> {
        let prompt = build_prompt(text);

        match self.client.complete(&prompt).await {
            Ok(completion) => {
                let summary = completion.trim();
                if summary.is_empty() {
                    tracing::warn!(
                        provider = self.client.provider_name(),
                        "Completion provider returned an empty summary"
                    );
                    return Err(SnippetError::Upstream);
                }
                Ok(summary.to_string())
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.client.provider_name(),
                    error = %e,
                    "Completion provider failed"
                );
                Err(SnippetError::Upstream)
            }
        }
    }
}
