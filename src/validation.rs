//! Request schema checks.
//!
//! The boundary runs these before a request reaches the orchestrator;
//! [`validate_text`] runs again inside `SnippetService::create`.

use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SnippetError;

/// Maximum snippet length in characters, after trimming.
pub const MAX_TEXT_CHARS: usize = 10_000;

/// Validated body of `POST /snippets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSnippetRequest {
    /// Trimmed snippet text.
    pub text: String,
}

/// Trim `raw` and check its length.
pub fn validate_text(raw: &str) -> Result<String, SnippetError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SnippetError::validation("Text cannot be empty"));
    }
    if trimmed.chars().count() > MAX_TEXT_CHARS {
        return Err(SnippetError::validation(
            "Text cannot exceed 10,000 characters",
        ));
    }
    Ok(trimmed.to_string())
}

fn snippet_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9a-fA-F]{24}$").expect("static pattern compiles"))
}

/// Check that a path id has the store's key shape.
pub fn validate_snippet_id(id: &str) -> Result<(), SnippetError> {
    if snippet_id_pattern().is_match(id) {
        Ok(())
    } else {
        Err(SnippetError::validation("Invalid snippet ID format"))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validate an already-parsed JSON body against the create schema.
pub fn parse_create_request(body: &Value) -> Result<CreateSnippetRequest, SnippetError> {
    let object = body.as_object().ok_or_else(|| {
        SnippetError::validation(format!(
            "Expected object, received {}",
            json_type_name(body)
        ))
    })?;

    let text = match object.get("text") {
        None => return Err(SnippetError::validation("Required")),
        Some(Value::String(s)) => s,
        Some(other) => {
            return Err(SnippetError::validation(format!(
                "Expected string, received {}",
                json_type_name(other)
            )))
        }
    };

    Ok(CreateSnippetRequest {
        text: validate_text(text)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_rejects_empty_and_blank() {
        assert_eq!(
            validate_text(""),
            Err(SnippetError::validation("Text cannot be empty"))
        );
        assert_eq!(
            validate_text("   \n\t"),
            Err(SnippetError::validation("Text cannot be empty"))
        );
    }

    #[test]
    fn test_length_boundary() {
        assert!(validate_text(&"a".repeat(MAX_TEXT_CHARS)).is_ok());
        assert_eq!(
            validate_text(&"a".repeat(MAX_TEXT_CHARS + 1)),
            Err(SnippetError::validation(
                "Text cannot exceed 10,000 characters"
            ))
        );
        // Surrounding whitespace does not count toward the limit.
        let padded = format!("  {}  ", "a".repeat(MAX_TEXT_CHARS));
        assert!(validate_text(&padded).is_ok());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let text = "é".repeat(MAX_TEXT_CHARS);
        assert!(text.len() > MAX_TEXT_CHARS);
        assert!(validate_text(&text).is_ok());
    }

    #[test]
    fn test_snippet_id_shape() {
        assert!(validate_snippet_id("507f1f77bcf86cd799439011").is_ok());
        assert!(validate_snippet_id("507F1F77BCF86CD799439011").is_ok());
        assert_eq!(
            validate_snippet_id("invalid-id"),
            Err(SnippetError::validation("Invalid snippet ID format"))
        );
        assert!(validate_snippet_id("507f1f77bcf86cd7994390111").is_err());
    }

    #[test]
    fn test_create_request_schema() {
        let ok = parse_create_request(&json!({ "text": "  trimmed text  " })).unwrap();
        assert_eq!(ok.text, "trimmed text");

        assert_eq!(
            parse_create_request(&json!({})),
            Err(SnippetError::validation("Required"))
        );
        assert_eq!(
            parse_create_request(&json!({ "text": null })),
            Err(SnippetError::validation("Expected string, received null"))
        );
        assert_eq!(
            parse_create_request(&json!({ "text": 42 })),
            Err(SnippetError::validation("Expected string, received number"))
        );
        assert_eq!(
            parse_create_request(&json!(["text"])),
            Err(SnippetError::validation("Expected object, received array"))
        );
    }

    proptest! {
        #[test]
        fn prop_valid_text_is_returned_trimmed(
            core in "[a-zA-Z0-9][a-zA-Z0-9 .,!?]{0,200}",
            lead in "[ \t\n]{0,5}",
            trail in "[ \t\n]{0,5}",
        ) {
            let raw = format!("{lead}{core}{trail}");
            let validated = validate_text(&raw).unwrap();
            prop_assert_eq!(validated, raw.trim().to_string());
        }

        #[test]
        fn prop_whitespace_only_is_rejected(ws in "[ \t\n\r]{0,50}") {
            prop_assert!(matches!(validate_text(&ws), Err(SnippetError::Validation(_))));
        }
    }
}
