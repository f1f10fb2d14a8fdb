//! Wire types for the tracking API.
//!
//! Field names follow the JSON contract (`trackingId`, `lastOpened`) rather
//! than Rust naming.

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use vassago_core::{format_timestamp, Error, Result, TrackingId, TrackingRecord};
use vassago_telemetry::MetricsSnapshot;

// === Dispatch ===

/// Body of `POST /send-email`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendEmailRequest {
    /// Recipient address, never empty.
    pub email: String,
}

impl SendEmailRequest {
    /// Parses a raw request body.
    ///
    /// Only a JSON object with a non-empty string `email` is accepted.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` with `Invalid JSON body` if the body does not parse,
    /// or `Email is required` for anything else that lacks a usable `email`.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|_| Error::invalid_request("Invalid JSON body"))?;

        value
            .as_object()
            .and_then(|fields| fields.get("email"))
            .and_then(Value::as_str)
            .filter(|email| !email.is_empty())
            .map(|email| Self {
                email: email.to_string(),
            })
            .ok_or_else(|| Error::invalid_request("Email is required"))
    }
}

/// Successful dispatch response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Identifier embedded in the tracking pixel URL.
    pub tracking_id: TrackingId,
}

// === Report ===

/// Open report for one recipient.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    /// Recipient address.
    pub email: String,
    /// Number of recorded opens.
    pub opens: u64,
    /// Time of the latest open, `null` if never opened.
    pub last_opened: Option<String>,
}

impl From<TrackingRecord> for ReportResponse {
    fn from(record: TrackingRecord) -> Self {
        Self {
            email: record.recipient,
            opens: record.open_count,
            last_opened: record.last_opened_at.as_ref().map(format_timestamp),
        }
    }
}

// === Errors ===

/// Error body shared by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Short description of the failure.
    pub error: String,
    /// Underlying cause, when one is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Creates an error body without details.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    /// Attaches the underlying cause.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Maps a service error to its HTTP status and body.
#[must_use]
pub fn error_parts(err: &Error) -> (StatusCode, ErrorResponse) {
    match err {
        Error::InvalidRequest { message } => {
            (StatusCode::BAD_REQUEST, ErrorResponse::new(message.as_str()))
        },
        Error::NotFound { .. } => (StatusCode::NOT_FOUND, ErrorResponse::new("No data found")),
        Error::Mail { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new("Failed to send email").with_details(message.as_str()),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new("Internal server error").with_details(other.to_string()),
        ),
    }
}

// === Status ===

/// Response of `GET /api/status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    /// Always `running` while the server answers.
    pub status: String,
    /// Seconds since the server started.
    pub uptime_seconds: u64,
    /// Number of tracking records held.
    pub tracked_emails: usize,
    /// Base URL used for tracking links.
    pub public_url: String,
    /// Dispatch and open counters.
    pub metrics: MetricsSnapshot,
}
