//! # Vassago Mail
//!
//! Composition and delivery of tracking emails.
//!
//! The service hands each message to a [`Mailer`] exactly once; delivery
//! errors are surfaced to the caller and never retried here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compose;
pub mod smtp;

use async_trait::async_trait;
use vassago_core::Result;

pub use compose::{tracking_email, tracking_url, TRACK_PATH_PREFIX};
pub use smtp::{SmtpMailer, SmtpSettings};

/// A fully composed HTML email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

/// The mail-sending collaborator.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one message.
    ///
    /// # Errors
    ///
    /// Returns [`vassago_core::Error::Mail`] if the message cannot be built or delivered.
    async fn send(&self, mail: OutgoingMail) -> Result<()>;
}
