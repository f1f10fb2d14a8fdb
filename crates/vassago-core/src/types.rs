//! Common types used across the Vassago ecosystem.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier correlating a sent email with its tracking record.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingId(pub String);

impl TrackingId {
    /// Creates a new random `TrackingId`.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TrackingId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TrackingId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Open-tracking state for one sent email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingRecord {
    /// Unique identifier, also the store key.
    pub id: TrackingId,
    /// Address the email was sent to.
    pub recipient: String,
    /// Number of pixel fetches seen so far.
    pub open_count: u64,
    /// Time of the most recent pixel fetch.
    pub last_opened_at: Option<DateTime<Utc>>,
    /// Time the record was created.
    pub created_at: DateTime<Utc>,
}

impl TrackingRecord {
    /// Creates an unopened record for `recipient` with a fresh identifier.
    #[must_use]
    pub fn new(recipient: impl Into<String>) -> Self {
        Self::with_id(TrackingId::generate(), recipient)
    }

    /// Creates an unopened record with the given identifier.
    #[must_use]
    pub fn with_id(id: TrackingId, recipient: impl Into<String>) -> Self {
        Self {
            id,
            recipient: recipient.into(),
            open_count: 0,
            last_opened_at: None,
            created_at: Utc::now(),
        }
    }

    /// Registers one open event at `at`.
    pub fn mark_opened(&mut self, at: DateTime<Utc>) {
        self.open_count += 1;
        self.last_opened_at = Some(at);
    }
}

/// Renders a timestamp as RFC 3339 UTC with millisecond precision,
/// e.g. `2024-01-01T12:00:00.000Z`.
#[must_use]
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_new_record_is_unopened() {
        let record = TrackingRecord::new("a@x.com");
        assert_eq!(record.recipient, "a@x.com");
        assert_eq!(record.open_count, 0);
        assert!(record.last_opened_at.is_none());
    }

    #[test]
    fn test_mark_opened_overwrites_timestamp() {
        let mut record = TrackingRecord::new("a@x.com");
        let first = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 1, 2, 8, 30, 0).unwrap();

        record.mark_opened(first);
        record.mark_opened(second);

        assert_eq!(record.open_count, 2);
        assert_eq!(record.last_opened_at, Some(second));
    }

    #[test]
    fn test_generated_ids_differ() {
        let a = TrackingId::generate();
        let b = TrackingId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_tracking_id_serializes_as_plain_string() {
        let id = TrackingId::from("abc-123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc-123\"");
    }

    #[test]
    fn test_format_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(format_timestamp(&at), "2024-01-01T12:00:00.000Z");
    }
}
