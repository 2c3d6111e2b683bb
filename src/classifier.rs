//! Error classifier chain.
//!
//! Maps any [`SnippetError`] to a uniform [`ErrorEnvelope`]. Rules are
//! evaluated in order and the first match wins, so order matters:
//!
//! | Order | Matches | Category | Status |
//! |---|---|---|---|
//! | 1 | `NotFound` | Not Found | 404 |
//! | 2 | `Upstream` | Service Unavailable | 503 |
//! | 3 | `Validation` | Validation Error | 400 |
//! | 4 | `MalformedKey` | Bad Request | 400 |
//! | 5 | anything (catch-all) | Internal Server Error | 500 |
//!
//! Extra rules go in with [`ClassifierChain::insert_rule`], which always
//! places them after the existing rules and before the catch-all.

use serde::{Deserialize, Serialize};

use crate::error::SnippetError;
use crate::types::format_timestamp;

/// Uniform error body returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Category label, serialized as `error`.
    #[serde(rename = "error")]
    pub category: String,
    /// Human-readable message.
    pub message: String,
    /// HTTP status code.
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// ISO-8601 time the envelope was produced.
    pub timestamp: String,
}

impl ErrorEnvelope {
    /// Create an envelope stamped with the current time.
    pub fn new(category: impl Into<String>, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            category: category.into(),
            message: message.into(),
            status_code,
            timestamp: format_timestamp(&chrono::Utc::now()),
        }
    }

    /// Envelope for a request body that could not be parsed.
    pub fn malformed_request() -> Self {
        Self::new("Bad Request", "Invalid JSON format", 400)
    }

    /// Envelope for a path no route matches.
    pub fn route_not_found(method: &str, path: &str) -> Self {
        Self::new("Route not found", format!("Cannot {} {}", method, path), 404)
    }

    /// Generic 500 envelope.
    pub fn internal() -> Self {
        Self::new("Internal Server Error", "Something went wrong", 500)
    }
}

/// Where a rule takes its envelope message from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePolicy {
    /// Always the same text.
    Fixed(&'static str),
    /// The failure's own `Display` output.
    FromError,
}

/// One entry in the chain: a predicate plus the envelope it produces.
#[derive(Clone, Copy)]
pub struct ErrorRule {
    /// Rule name, for logs.
    pub name: &'static str,
    predicate: fn(&SnippetError) -> bool,
    category: &'static str,
    status_code: u16,
    message: MessagePolicy,
}

impl ErrorRule {
    /// Create a rule.
    pub const fn new(
        name: &'static str,
        predicate: fn(&SnippetError) -> bool,
        category: &'static str,
        status_code: u16,
        message: MessagePolicy,
    ) -> Self {
        Self {
            name,
            predicate,
            category,
            status_code,
            message,
        }
    }

    /// Whether this rule handles `error`.
    pub fn matches(&self, error: &SnippetError) -> bool {
        (self.predicate)(error)
    }

    /// Build the envelope for `error`. Always a fresh timestamp.
    pub fn envelope(&self, error: &SnippetError) -> ErrorEnvelope {
        let message = match self.message {
            MessagePolicy::Fixed(text) => text.to_string(),
            MessagePolicy::FromError => error.to_string(),
        };
        ErrorEnvelope::new(self.category, message, self.status_code)
    }

    /// Status code this rule produces.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }
}

impl std::fmt::Debug for ErrorRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorRule")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("status_code", &self.status_code)
            .field("message", &self.message)
            .finish()
    }
}

fn is_not_found(e: &SnippetError) -> bool {
    matches!(e, SnippetError::NotFound)
}

fn is_upstream(e: &SnippetError) -> bool {
    matches!(e, SnippetError::Upstream)
}

fn is_validation(e: &SnippetError) -> bool {
    matches!(e, SnippetError::Validation(_))
}

fn is_malformed_key(e: &SnippetError) -> bool {
    matches!(e, SnippetError::MalformedKey(_))
}

fn always(_: &SnippetError) -> bool {
    true
}

/// Not-found failures. Checked first so they never reach the catch-all.
pub const NOT_FOUND_RULE: ErrorRule = ErrorRule::new(
    "snippet_not_found",
    is_not_found,
    "Not Found",
    404,
    MessagePolicy::Fixed("Snippet not found"),
);

/// Summarizer failures ("Failed to generate summary ...").
pub const UPSTREAM_RULE: ErrorRule = ErrorRule::new(
    "ai_service",
    is_upstream,
    "Service Unavailable",
    503,
    MessagePolicy::Fixed("AI service is currently unavailable"),
);

/// Field and schema failures; the message is passed through.
pub const VALIDATION_RULE: ErrorRule = ErrorRule::new(
    "validation",
    is_validation,
    "Validation Error",
    400,
    MessagePolicy::FromError,
);

/// Ids the store could not cast to its key format.
pub const MALFORMED_KEY_RULE: ErrorRule = ErrorRule::new(
    "malformed_key",
    is_malformed_key,
    "Bad Request",
    400,
    MessagePolicy::Fixed("Invalid ID format"),
);

/// Everything else.
pub const CATCH_ALL_RULE: ErrorRule = ErrorRule::new(
    "default",
    always,
    "Internal Server Error",
    500,
    MessagePolicy::Fixed("Something went wrong"),
);

/// Ordered failure-to-envelope mapping.
#[derive(Debug, Clone)]
pub struct ClassifierChain {
    rules: Vec<ErrorRule>,
    catch_all: Option<ErrorRule>,
}

impl ClassifierChain {
    /// The standard five-rule chain.
    pub fn new() -> Self {
        Self {
            rules: vec![NOT_FOUND_RULE, UPSTREAM_RULE, VALIDATION_RULE, MALFORMED_KEY_RULE],
            catch_all: Some(CATCH_ALL_RULE),
        }
    }

    /// A chain with no rules at all; every failure hits the safety net.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            catch_all: None,
        }
    }

    /// Add a rule after the existing ones and before the catch-all.
    pub fn insert_rule(&mut self, rule: ErrorRule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Rule names in evaluation order, catch-all included.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules
            .iter()
            .chain(self.catch_all.iter())
            .map(|rule| rule.name)
            .collect()
    }

    /// First matching rule, if any.
    pub fn find_rule(&self, error: &SnippetError) -> Option<&ErrorRule> {
        self.rules
            .iter()
            .chain(self.catch_all.iter())
            .find(|rule| rule.matches(error))
    }

    /// Turn `error` into an envelope.
    ///
    /// Falls back to a generic 500 if no rule matches, which can only
    /// happen on a chain built without the catch-all.
    pub fn classify(&self, error: &SnippetError) -> ErrorEnvelope {
        let envelope = match self.find_rule(error) {
            Some(rule) => rule.envelope(error),
            None => {
                tracing::warn!(kind = error.kind(), "No classifier rule matched");
                ErrorEnvelope::internal()
            }
        };

        if envelope.status_code >= 500 {
            tracing::error!(
                kind = error.kind(),
                error = %error,
                status = envelope.status_code,
                "Request failed"
            );
        } else {
            tracing::warn!(
                kind = error.kind(),
                error = %error,
                status = envelope.status_code,
                "Request rejected"
            );
        }

        envelope
    }
}

impl Default for ClassifierChain {
    fn default() -> Self {
        Self::new()
    }
}
