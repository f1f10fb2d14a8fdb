//! # Vassago Telemetry
//!
//! Observability for the Vassago ecosystem: structured logging and
//! lightweight in-process counters for dispatch and open events.
//!
//! ## Features
//!
//! - **Structured Logging**: compact text or JSON output, SMTP and HTTP
//!   plumbing held at `warn`, overridable with `RUST_LOG`
//! - **Service Counters**: emails sent, send failures, pixel hits and misses

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod logging;
pub mod metrics;

pub use logging::{filter_directives, init_logging, LoggingError};
pub use metrics::{MetricsSnapshot, SendTimer, TrackingMetrics};

/// Configuration for telemetry.
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line.
    pub service_name: String,
    /// Log level (or any `EnvFilter` directive).
    pub log_level: String,
    /// Enable JSON logging.
    pub json_logs: bool,
    /// Emit a `tower_http` span for every request.
    pub access_log: bool,
}

impl TelemetryConfig {
    /// Creates a new telemetry configuration.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            log_level: "info".to_string(),
            json_logs: false,
            access_log: false,
        }
    }

    /// Sets the log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enables JSON logging.
    #[must_use]
    pub fn with_json_logs(mut self) -> Self {
        self.json_logs = true;
        self
    }

    /// Enables per-request access logging.
    #[must_use]
    pub fn with_access_log(mut self) -> Self {
        self.access_log = true;
        self
    }
}
