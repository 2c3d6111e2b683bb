//! Core types for the snippet summarizer.

pub mod snippet;

pub use snippet::{
    format_timestamp, InvalidSnippetId, Snippet, SnippetId, SnippetList, SnippetResponse,
    SNIPPET_ID_HEX_LEN,
};
