//! In-memory snippet store for testing and local runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use super::SnippetStore;
use crate::error::StoreError;
use crate::types::{Snippet, SnippetId};

#[derive(Debug, Default)]
struct Inner {
    /// Snippets by ID.
    snippets: BTreeMap<SnippetId, Snippet>,
    /// Last assigned `created_at`, to keep timestamps strictly increasing.
    last_created_at: Option<DateTime<Utc>>,
}

/// In-memory snippet store.
///
/// Uses a BTreeMap for deterministic iteration order. The lock is never
/// held across an `.await`.
#[derive(Debug, Default)]
pub struct InMemorySnippetStore {
    inner: RwLock<Inner>,
}

impl InMemorySnippetStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pre-built snippet, bypassing id and timestamp assignment.
    pub fn add_snippet(&self, snippet: Snippet) {
        let mut inner = self.inner.write();
        if inner.last_created_at.map_or(true, |last| snippet.created_at > last) {
            inner.last_created_at = Some(snippet.created_at);
        }
        inner.snippets.insert(snippet.id, snippet);
    }

    /// Get number of snippets.
    pub fn len(&self) -> usize {
        self.inner.read().snippets.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().snippets.is_empty()
    }
}

#[async_trait]
impl SnippetStore for InMemorySnippetStore {
    async fn insert(&self, text: &str, summary: &str) -> Result<Snippet, StoreError> {
        let mut inner = self.inner.write();

        let mut created_at = Utc::now();
        if let Some(last) = inner.last_created_at {
            if created_at <= last {
                created_at = last + Duration::microseconds(1);
            }
        }
        inner.last_created_at = Some(created_at);

        let snippet = Snippet::new(SnippetId::generate_at(created_at), text, summary, created_at);
        inner.snippets.insert(snippet.id, snippet.clone());
        Ok(snippet)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Snippet>, StoreError> {
        let id = SnippetId::parse(id)?;
        Ok(self.inner.read().snippets.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Snippet>, StoreError> {
        let mut snippets: Vec<Snippet> = self.inner.read().snippets.values().cloned().collect();
        snippets.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(snippets)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.read().snippets.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = InMemorySnippetStore::new();
        let snippet = store.insert("Some text", "A summary").await.unwrap();

        let found = store
            .find_by_id(&snippet.id.to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, snippet);
        assert_eq!(found.created_at, found.updated_at);
    }

    #[tokio::test]
    async fn test_unknown_id_is_absent() {
        let store = InMemorySnippetStore::new();
        let found = store.find_by_id("507f1f77bcf86cd799439011").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_malformed_id_is_cast_error() {
        let store = InMemorySnippetStore::new();
        let err = store.find_by_id("invalid-id").await.unwrap_err();
        assert!(matches!(err, StoreError::MalformedKey(_)));
    }

    #[tokio::test]
    async fn test_find_all_newest_first() {
        let store = InMemorySnippetStore::new();
        let a = store.insert("first", "s1").await.unwrap();
        let b = store.insert("second", "s2").await.unwrap();
        let c = store.insert("third", "s3").await.unwrap();

        assert!(a.created_at < b.created_at);
        assert!(b.created_at < c.created_at);

        let all = store.find_all().await.unwrap();
        let ids: Vec<_> = all.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_insert_after_seeded_future_snippet_stays_monotonic() {
        let store = InMemorySnippetStore::new();
        let future = Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap();
        let seeded = Snippet::new(
            SnippetId::parse("507f1f77bcf86cd799439011").unwrap(),
            "seeded",
            "seeded summary",
            future,
        );
        store.add_snippet(seeded);

        let inserted = store.insert("fresh", "summary").await.unwrap();
        assert!(inserted.created_at > future);
        assert_eq!(store.find_all().await.unwrap()[0].id, inserted.id);
    }
}
