//! Failure taxonomy shared by the orchestrator, the store and the boundary.

use crate::types::InvalidSnippetId;

/// Message carried by every not-found failure.
pub const SNIPPET_NOT_FOUND: &str = "Snippet not found";

/// Message carried by every summarizer failure, whatever the provider said.
pub const SUMMARY_FAILED: &str = "Failed to generate summary from AI service";

/// A failure raised while serving a snippet request.
///
/// Variants are produced at the point of failure and propagated unchanged
/// up to the boundary, where [`crate::classifier::ClassifierChain`] turns
/// them into an [`crate::classifier::ErrorEnvelope`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnippetError {
    /// Input failed a field or schema check.
    #[error("{0}")]
    Validation(String),

    /// No snippet exists with the requested id.
    #[error("Snippet not found")]
    NotFound,

    /// The id does not match the store's key format.
    #[error("{0}")]
    MalformedKey(String),

    /// The summarizer was unreachable or returned nothing usable.
    #[error("Failed to generate summary from AI service")]
    Upstream,

    /// The store failed. Passed through without special handling.
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// The request body could not be parsed at all.
    #[error("{0}")]
    MalformedRequest(String),
}

impl SnippetError {
    /// Create a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Short machine-readable name of the variant, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound => "not_found",
            Self::MalformedKey(_) => "malformed_key",
            Self::Upstream => "upstream",
            Self::Persistence(_) => "persistence",
            Self::MalformedRequest(_) => "malformed_request",
        }
    }
}

/// Error type for snippet store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The id could not be cast to the store's key format.
    #[error(transparent)]
    MalformedKey(#[from] InvalidSnippetId),

    /// The backend failed (connection, query, decode).
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create a backend error from any error type.
    pub fn backend<E: std::error::Error>(e: E) -> Self {
        Self::Backend(e.to_string())
    }
}

impl From<StoreError> for SnippetError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::MalformedKey(invalid) => Self::MalformedKey(invalid.to_string()),
            StoreError::Backend(msg) => Self::Persistence(msg),
        }
    }
}
