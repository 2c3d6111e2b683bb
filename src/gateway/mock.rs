//! Deterministic completion client.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{CompletionClient, CompletionError};

/// How the mock answers.
#[derive(Debug, Clone)]
enum MockBehavior {
    /// `"Mock summary: "` followed by the last five words of the prompt.
    Echo,
    /// Always the same text.
    Fixed(String),
    /// Always the same error.
    Fail(CompletionError),
}

/// Mock completion client for tests and offline runs.
///
/// Makes no network calls. Clones share the call counter and the
/// last-seen prompt.
///
/// # Examples
///
/// ```
/// use snippet_summarizer::gateway::{CompletionClient, MockCompletionClient};
///
/// # tokio_test_block(async {
/// let client = MockCompletionClient::new();
/// let out = client.complete("alpha beta gamma delta epsilon zeta").await.unwrap();
/// assert_eq!(out, "Mock summary: beta gamma delta epsilon zeta");
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockCompletionClient {
    behavior: MockBehavior,
    call_count: Arc<AtomicUsize>,
    last_prompt: Arc<Mutex<Option<String>>>,
}

impl MockCompletionClient {
    /// Echo the tail of the prompt back as the summary.
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::Echo)
    }

    /// Always answer with `response`.
    pub fn fixed(response: impl Into<String>) -> Self {
        Self::with_behavior(MockBehavior::Fixed(response.into()))
    }

    /// Always fail with `error`.
    pub fn failing(error: CompletionError) -> Self {
        Self::with_behavior(MockBehavior::Fail(error))
    }

    fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
            last_prompt: Arc::new(Mutex::new(None)),
        }
    }

    /// Number of completions requested so far.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The most recent prompt, if any.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().clone()
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock() = Some(prompt.to_string());

        match &self.behavior {
            MockBehavior::Echo => {
                let words: Vec<&str> = prompt.split(' ').collect();
                let tail = &words[words.len().saturating_sub(5)..];
                Ok(format!("Mock summary: {}", tail.join(" ")))
            }
            MockBehavior::Fixed(response) => Ok(response.clone()),
            MockBehavior::Fail(error) => Err(error.clone()),
        }
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_uses_last_five_words() {
        let client = MockCompletionClient::new();
        let out = client.complete("one two three").await.unwrap();
        assert_eq!(out, "Mock summary: one two three");
    }

    #[tokio::test]
    async fn test_clones_share_call_count() {
        let first = MockCompletionClient::fixed("x");
        let second = first.clone();

        first.complete("a").await.unwrap();
        second.complete("b").await.unwrap();

        assert_eq!(first.call_count(), 2);
        assert_eq!(second.last_prompt().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_failing_returns_configured_error() {
        let client = MockCompletionClient::failing(CompletionError::EmptyCompletion);
        assert_eq!(
            client.complete("a").await.unwrap_err(),
            CompletionError::EmptyCompletion
        );
    }
}
