//! Snippet types for the summarizer.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Number of hex characters in a rendered [`SnippetId`].
pub const SNIPPET_ID_HEX_LEN: usize = 24;

/// Error returned when a string is not a well-formed snippet identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cast to SnippetId failed for value \"{0}\"")]
pub struct InvalidSnippetId(pub String);

/// Unique identifier for a stored snippet.
///
/// Twelve bytes rendered as 24 lowercase hex characters:
/// a 4-byte big-endian timestamp (seconds), 5 process-unique bytes,
/// and a 3-byte big-endian counter. Ids generated by one process sort
/// in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnippetId([u8; 12]);

fn process_entropy() -> &'static [u8; 5] {
    static ENTROPY: OnceLock<[u8; 5]> = OnceLock::new();
    ENTROPY.get_or_init(|| {
        let bytes = Uuid::new_v4().into_bytes();
        [bytes[0], bytes[1], bytes[2], bytes[3], bytes[4]]
    })
}

fn next_counter() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| {
        let bytes = Uuid::new_v4().into_bytes();
        AtomicU32::new(u32::from_be_bytes([0, bytes[5], bytes[6], bytes[7]]))
    });
    counter.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff
}

impl SnippetId {
    /// Generate a fresh id stamped with the current time.
    pub fn generate() -> Self {
        Self::generate_at(Utc::now())
    }

    /// Generate a fresh id stamped with the given time.
    pub fn generate_at(at: DateTime<Utc>) -> Self {
        let seconds = at.timestamp().clamp(0, u32::MAX as i64) as u32;
        let counter = next_counter();

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(process_entropy());
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Build an id from raw bytes.
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Raw bytes of the id.
    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Seconds since the Unix epoch embedded in the id.
    pub fn timestamp_secs(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Parse a 24-character hex string (either case).
    pub fn parse(s: &str) -> Result<Self, InvalidSnippetId> {
        if s.len() != SNIPPET_ID_HEX_LEN {
            return Err(InvalidSnippetId(s.to_string()));
        }
        let decoded = hex::decode(s).map_err(|_| InvalidSnippetId(s.to_string()))?;
        let bytes: [u8; 12] = decoded
            .try_into()
            .map_err(|_| InvalidSnippetId(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl FromStr for SnippetId {
    type Err = InvalidSnippetId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SnippetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Serialize for SnippetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SnippetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A persisted snippet: the original text paired with its summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Store-assigned identifier.
    pub id: SnippetId,
    /// Original input, trimmed.
    pub text: String,
    /// AI-generated summary.
    pub summary: String,
    /// Insert time. Sole sort key for listing.
    pub created_at: DateTime<Utc>,
    /// Equal to `created_at`; snippets are never updated.
    pub updated_at: DateTime<Utc>,
}

impl Snippet {
    /// Create a snippet record stamped at `created_at`.
    pub fn new(
        id: SnippetId,
        text: impl Into<String>,
        summary: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            summary: summary.into(),
            created_at,
            updated_at: created_at,
        }
    }
}

/// Format a timestamp the way clients expect: `2024-01-01T00:00:00.000Z`.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Public shape of a snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetResponse {
    /// 24-character hex id.
    pub id: String,
    /// Original text.
    pub text: String,
    /// Generated summary.
    pub summary: String,
    /// ISO-8601 creation time, serialized as `createdAt`.
    pub created_at: String,
}

impl From<Snippet> for SnippetResponse {
    fn from(snippet: Snippet) -> Self {
        Self {
            id: snippet.id.to_string(),
            created_at: format_timestamp(&snippet.created_at),
            text: snippet.text,
            summary: snippet.summary,
        }
    }
}

/// All snippets, newest first, with an independently counted total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetList {
    /// Newest first.
    pub snippets: Vec<SnippetResponse>,
    /// Count from a separate query; may differ from `snippets.len()`.
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_snippet_id_roundtrips_through_display() {
        let id = SnippetId::generate();
        let rendered = id.to_string();

        assert_eq!(rendered.len(), SNIPPET_ID_HEX_LEN);
        assert_eq!(SnippetId::parse(&rendered).unwrap(), id);
    }

    #[test]
    fn test_snippet_id_accepts_uppercase() {
        let id = SnippetId::parse("507F1F77BCF86CD799439011").unwrap();
        assert_eq!(id.to_string(), "507f1f77bcf86cd799439011");
    }

    #[test]
    fn test_snippet_id_rejects_malformed() {
        assert!(SnippetId::parse("invalid-id").is_err());
        assert!(SnippetId::parse("507f1f77bcf86cd79943901").is_err());
        assert!(SnippetId::parse("507f1f77bcf86cd79943901z").is_err());
        assert!(SnippetId::parse("").is_err());
    }

    #[test]
    fn test_snippet_ids_sort_in_generation_order() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let first = SnippetId::generate_at(at);
        let second = SnippetId::generate_at(at);

        assert_ne!(first, second);
        assert_eq!(first.timestamp_secs(), at.timestamp() as u32);
        // Counter wraparound aside, later ids compare greater.
        if first.as_bytes()[9..] != [0xff, 0xff, 0xff] {
            assert!(second > first);
        }
    }

    #[test]
    fn test_response_uses_iso_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let id = SnippetId::parse("507f1f77bcf86cd799439011").unwrap();
        let snippet = Snippet::new(id, "Test text", "Test summary", at);

        let response = SnippetResponse::from(snippet);
        assert_eq!(response.id, "507f1f77bcf86cd799439011");
        assert_eq!(response.created_at, "2024-01-01T00:00:00.000Z");

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }
}
