//! Service state management.

use std::sync::Arc;

use crate::classifier::ClassifierChain;
use crate::gateway::{CompletionClient, Summarizer};
use crate::orchestrator::SnippetService;
use crate::store::SnippetStore;

/// Shared service state.
///
/// Built once at startup; handlers only read it.
pub struct ServiceState<S: SnippetStore + 'static, C: CompletionClient + 'static> {
    /// Snippet use cases.
    pub snippets: Arc<SnippetService<S, C>>,
    /// Failure-to-envelope mapping used by every handler.
    pub classifier: Arc<ClassifierChain>,
}

impl<S: SnippetStore + 'static, C: CompletionClient + 'static> ServiceState<S, C> {
    /// Create service state with the standard classifier chain.
    ///
    /// # Arguments
    /// * `store` - The snippet store backend
    /// * `client` - The completion provider behind the summarizer
    pub fn new(store: S, client: C) -> Self {
        Self::with_classifier(store, client, ClassifierChain::new())
    }

    /// Create service state with a custom classifier chain.
    pub fn with_classifier(store: S, client: C, classifier: ClassifierChain) -> Self {
        Self {
            snippets: Arc::new(SnippetService::new(store, Summarizer::new(client))),
            classifier: Arc::new(classifier),
        }
    }
}

impl<S: SnippetStore + 'static, C: CompletionClient + 'static> Clone for ServiceState<S, C> {
    fn clone(&self) -> Self {
        Self {
            snippets: Arc::clone(&self.snippets),
            classifier: Arc::clone(&self.classifier),
        }
    }
}
