//! Snippet storage backends.

pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::Snippet;

/// Trait for snippet storage backends.
///
/// Implementations assign the id and `created_at` on insert, and make the
/// insert atomic: a snippet is visible with both text and summary, or not
/// at all.
#[async_trait]
pub trait SnippetStore: Send + Sync {
    /// Persist a new snippet and return the stored record.
    async fn insert(&self, text: &str, summary: &str) -> Result<Snippet, StoreError>;

    /// Fetch a snippet by its string id.
    ///
    /// Returns [`StoreError::MalformedKey`] if `id` is not a valid key,
    /// `Ok(None)` if it is valid but unknown.
    async fn find_by_id(&self, id: &str) -> Result<Option<Snippet>, StoreError>;

    /// All snippets, newest first.
    async fn find_all(&self) -> Result<Vec<Snippet>, StoreError>;

    /// Number of stored snippets.
    async fn count(&self) -> Result<u64, StoreError>;

    /// Whether the backend is reachable.
    async fn is_healthy(&self) -> bool {
        true
    }
}

#[async_trait]
impl<T: SnippetStore + ?Sized> SnippetStore for Arc<T> {
    async fn insert(&self, text: &str, summary: &str) -> Result<Snippet, StoreError> {
        (**self).insert(text, summary).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Snippet>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<Snippet>, StoreError> {
        (**self).find_all().await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        (**self).count().await
    }

    async fn is_healthy(&self) -> bool {
        (**self).is_healthy().await
    }
}

pub use memory::InMemorySnippetStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresSnippetStore;
