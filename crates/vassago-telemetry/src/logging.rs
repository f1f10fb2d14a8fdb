//! Log subscriber setup for the tracking service.

use tracing_subscriber::{
    filter::ParseError,
    fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

use crate::TelemetryConfig;

/// Dependencies held at `warn` unless the configured level names them.
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "h2", "rustls", "lettre"];

/// Errors from [`init_logging`].
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The configured level is not a valid filter directive.
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    /// A global subscriber is already installed.
    #[error("{0}")]
    Init(#[from] TryInitError),
}

/// Builds the filter directives for `config`.
///
/// The configured level applies to the service crates. SMTP, TLS and HTTP
/// plumbing stay at `warn`, and per-request `tower_http` spans are only
/// emitted with [`TelemetryConfig::access_log`].
#[must_use]
pub fn filter_directives(config: &TelemetryConfig) -> String {
    let mut directives = vec![config.log_level.clone()];

    for target in QUIET_TARGETS {
        if !config.log_level.contains(target) {
            directives.push(format!("{target}=warn"));
        }
    }

    if !config.log_level.contains("tower_http") {
        let level = if config.access_log { "debug" } else { "warn" };
        directives.push(format!("tower_http={level}"));
    }

    directives.join(",")
}

/// Installs the global subscriber.
///
/// `RUST_LOG`, when set, replaces the directives from [`filter_directives`].
///
/// # Errors
///
/// Returns an error if the level does not parse or a subscriber is already
/// installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), LoggingError> {
    let (filter, source) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, "RUST_LOG"),
        Err(_) => (EnvFilter::try_new(filter_directives(config))?, "config"),
    };
    let directives = filter.to_string();

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .try_init()?;
    } else {
        registry.with(fmt::layer().compact().with_target(false)).try_init()?;
    }

    tracing::info!(
        service = %config.service_name,
        filter = %directives,
        source,
        json = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}
