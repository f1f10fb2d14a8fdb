//! Error types for the Vassago ecosystem.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the Vassago ecosystem.
#[derive(Error, Debug)]
pub enum Error {
    /// The request was missing a required field or could not be parsed.
    #[error("{message}")]
    InvalidRequest {
        /// Description of what was wrong with the request.
        message: String,
    },

    /// No record matched the lookup.
    #[error("{what} not found: {key}")]
    NotFound {
        /// Kind of thing that was looked up.
        what: &'static str,
        /// The key that had no match.
        key: String,
    },

    /// The mail collaborator rejected or failed to deliver a message.
    #[error("{message}")]
    Mail {
        /// Error message reported by the mail layer.
        message: String,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

}

impl Error {
    /// Returns `true` if the error was caused by the caller's input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest { .. } | Self::NotFound { .. })
    }

    /// Creates an invalid request error with the given message.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(what: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            key: key.into(),
        }
    }

    /// Creates a mail error from anything displayable.
    #[must_use]
    pub fn mail(message: impl std::fmt::Display) -> Self {
        Self::Mail {
            message: message.to_string(),
        }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
