//! # snippet-summarizer
//!
//! Stores text snippets alongside an AI-generated summary.
//!
//! A client submits raw text; the service asks a completion provider for a
//! short summary, persists text and summary together, and serves snippets
//! back individually or as a newest-first list.
//!
//! ## Architecture
//!
//! ```text
//! HTTP boundary → validation → SnippetService ─┬→ Summarizer → CompletionClient
//!       ↑                                      └→ SnippetStore (Postgres or Memory)
//!       └──────── ClassifierChain ← SnippetError
//! ```
//!
//! ## Guarantees
//!
//! - A snippet is never persisted without a summary
//! - Listing is ordered by creation time, newest first
//! - Every failure reaches the client as the same
//!   `{error, message, statusCode, timestamp}` envelope

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classifier;
pub mod config;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use classifier::{ClassifierChain, ErrorEnvelope, ErrorRule, MessagePolicy};
pub use config::{ConfigError, OpenAiConfig, ServiceConfig};
pub use error::{SnippetError, StoreError};
pub use gateway::{CompletionClient, CompletionError, MockCompletionClient, Summarizer};
#[cfg(feature = "openai")]
pub use gateway::OpenAiCompletionClient;
pub use orchestrator::SnippetService;
pub use store::{InMemorySnippetStore, SnippetStore};
#[cfg(feature = "postgres")]
pub use store::PostgresSnippetStore;
pub use types::{Snippet, SnippetId, SnippetList, SnippetResponse};
pub use validation::{validate_snippet_id, validate_text, CreateSnippetRequest, MAX_TEXT_CHARS};
