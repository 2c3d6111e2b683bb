//! Snippet use cases.
//!
//! [`SnippetService`] is the only place that sequences business steps:
//!
//! ```text
//! create:    validate → Summarizer::summarize → SnippetStore::insert → shape
//! get_by_id: SnippetStore::find_by_id → NotFound if absent → shape
//! list_all:  SnippetStore::find_all + SnippetStore::count → shape
//! ```
//!
//! Every failure propagates once, unchanged. Nothing is retried.

use crate::error::SnippetError;
use crate::gateway::{CompletionClient, Summarizer};
use crate::store::SnippetStore;
use crate::types::{SnippetList, SnippetResponse};
use crate::validation::validate_text;

/// Orchestrates the summarizer and the store.
///
/// Both collaborators are passed in; wiring concrete defaults is the
/// caller's job.
pub struct SnippetService<S: SnippetStore, C: CompletionClient> {
    store: S,
    summarizer: Summarizer<C>,
}

impl<S: SnippetStore, C: CompletionClient> SnippetService<S, C> {
    /// Create a service over a store and a summarizer.
    pub fn new(store: S, summarizer: Summarizer<C>) -> Self {
        Self { store, summarizer }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The underlying summarizer.
    pub fn summarizer(&self) -> &Summarizer<C> {
        &self.summarizer
    }

    /// Summarize and persist `raw_text`.
    ///
    /// The text is trimmed and re-validated even if the boundary already
    /// checked it. The summary is generated before anything is written.
    pub async fn create(&self, raw_text: &str) -> Result<SnippetResponse, SnippetError> {
        let text = validate_text(raw_text)?;

        let summary = self.summarizer.summarize(&text).await?;
        let snippet = self.store.insert(&text, &summary).await?;

        tracing::info!(
            snippet_id = %snippet.id,
            text_chars = text.chars().count(),
            summary_chars = summary.chars().count(),
            "Snippet created"
        );

        Ok(snippet.into())
    }

    /// Fetch one snippet.
    ///
    /// # Errors
    ///
    /// - [`SnippetError::NotFound`] if no snippet has this id
    /// - [`SnippetError::MalformedKey`] if the store cannot cast `id`
    pub async fn get_by_id(&self, id: &str) -> Result<SnippetResponse, SnippetError> {
        let snippet = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(SnippetError::NotFound)?;
        Ok(snippet.into())
    }

    /// All snippets, newest first.
    ///
    /// `total` comes from a separate count query rather than the list
    /// length; a concurrent insert between the two calls can make them
    /// differ.
    pub async fn list_all(&self) -> Result<SnippetList, SnippetError> {
        let snippets = self.store.find_all().await?;
        let total = self.store.count().await?;

        Ok(SnippetList {
            snippets: snippets.into_iter().map(SnippetResponse::from).collect(),
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StoreError, SNIPPET_NOT_FOUND, SUMMARY_FAILED};
    use crate::gateway::{CompletionError, MockCompletionClient};
    use crate::store::InMemorySnippetStore;
    use crate::types::Snippet;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn service_with(
        client: MockCompletionClient,
    ) -> SnippetService<Arc<InMemorySnippetStore>, MockCompletionClient> {
        SnippetService::new(
            Arc::new(InMemorySnippetStore::new()),
            Summarizer::new(client),
        )
    }

    /// Store whose writes always fail; counts how often it was asked.
    #[derive(Default)]
    struct BrokenStore {
        inserts: AtomicUsize,
    }

    #[async_trait]
    impl SnippetStore for BrokenStore {
        async fn insert(&self, _text: &str, _summary: &str) -> Result<Snippet, StoreError> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Backend("DB error".to_string()))
        }

        async fn find_by_id(&self, _id: &str) -> Result<Option<Snippet>, StoreError> {
            Err(StoreError::Backend("DB error".to_string()))
        }

        async fn find_all(&self) -> Result<Vec<Snippet>, StoreError> {
            Ok(Vec::new())
        }

        async fn count(&self) -> Result<u64, StoreError> {
            Err(StoreError::Backend("count failed".to_string()))
        }
    }

    #[tokio::test]
    async fn test_create_trims_and_summarizes() {
        let client = MockCompletionClient::fixed("Test snippet summary");
        let service = service_with(client.clone());

        let created = service
            .create("  This is a test snippet that needs summarization.  ")
            .await
            .unwrap();

        assert_eq!(created.text, "This is a test snippet that needs summarization.");
        assert_eq!(created.summary, "Test snippet summary");
        assert_eq!(
            client.last_prompt().as_deref(),
            Some("Summarize the following text in 30 words or less: This is a test snippet that needs summarization.")
        );
        assert_eq!(service.store().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_text_without_calling_provider() {
        let client = MockCompletionClient::new();
        let service = service_with(client.clone());

        for bad in ["".to_string(), "   ".to_string(), "a".repeat(10_001)] {
            let err = service.create(&bad).await.unwrap_err();
            assert!(matches!(err, SnippetError::Validation(_)), "{bad:?} -> {err:?}");
        }
        assert_eq!(client.call_count(), 0);
        assert!(service.store().is_empty());
    }

    #[tokio::test]
    async fn test_create_upstream_failure_persists_nothing() {
        let service = service_with(MockCompletionClient::failing(
            CompletionError::Communication("AI service error".to_string()),
        ));

        let err = service.create("Test text").await.unwrap_err();
        assert_eq!(err, SnippetError::Upstream);
        assert!(err.to_string().contains("Failed to generate summary"));
        assert_eq!(err.to_string(), SUMMARY_FAILED);
        assert!(service.store().is_empty());
    }

    #[tokio::test]
    async fn test_create_store_failure_propagates() {
        let client = MockCompletionClient::fixed("Summary");
        let service = SnippetService::new(BrokenStore::default(), Summarizer::new(client.clone()));

        let err = service.create("Test text").await.unwrap_err();
        assert_eq!(err, SnippetError::Persistence("DB error".to_string()));
        // Summary was generated first, then exactly one insert attempted.
        assert_eq!(client.call_count(), 1);
        assert_eq!(service.store().inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_by_id_roundtrip() {
        let service = service_with(MockCompletionClient::new());
        let created = service.create("Test snippet for retrieval").await.unwrap();

        let fetched = service.get_by_id(&created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_by_id_unknown_is_not_found() {
        let service = service_with(MockCompletionClient::new());

        let err = service
            .get_by_id("507f1f77bcf86cd799439011")
            .await
            .unwrap_err();
        assert_eq!(err, SnippetError::NotFound);
        assert_eq!(err.to_string(), SNIPPET_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_by_id_malformed_is_never_not_found() {
        let service = service_with(MockCompletionClient::new());

        let err = service.get_by_id("invalid-id").await.unwrap_err();
        assert!(matches!(err, SnippetError::MalformedKey(_)));
    }

    #[tokio::test]
    async fn test_list_all_empty() {
        let service = service_with(MockCompletionClient::new());
        let list = service.list_all().await.unwrap();

        assert!(list.snippets.is_empty());
        assert_eq!(list.total, 0);
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let service = service_with(MockCompletionClient::new());
        let a = service.create("first snippet").await.unwrap();
        let b = service.create("second snippet").await.unwrap();

        let list = service.list_all().await.unwrap();
        assert_eq!(list.total, 2);
        assert_eq!(list.snippets[0].id, b.id);
        assert_eq!(list.snippets[1].id, a.id);
    }

    #[tokio::test]
    async fn test_list_all_total_comes_from_count_query() {
        let service = SnippetService::new(
            BrokenStore::default(),
            Summarizer::new(MockCompletionClient::new()),
        );

        // find_all succeeds, count fails: the failure surfaces instead of
        // falling back to the list length.
        let err = service.list_all().await.unwrap_err();
        assert_eq!(err, SnippetError::Persistence("count failed".to_string()));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_create_keeps_trimmed_text(
            core in "[a-zA-Z0-9]{1,20}( [a-zA-Z0-9]{1,10}){0,6}",
            pad in "[ \t\n]{0,4}",
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let service = service_with(MockCompletionClient::new());

            let created = runtime
                .block_on(service.create(&format!("{pad}{core}{pad}")))
                .unwrap();
            prop_assert_eq!(created.text, core);
            prop_assert!(!created.summary.is_empty());
        }
    }
}
