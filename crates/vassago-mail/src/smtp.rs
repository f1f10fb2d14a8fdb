//! SMTP delivery over an authenticated TLS relay.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use vassago_core::{Error, Result};

use crate::{Mailer, OutgoingMail};

/// Connection settings for the SMTP relay.
#[derive(Clone)]
pub struct SmtpSettings {
    /// Relay host name.
    pub host: String,
    /// Relay port (implicit TLS).
    pub port: u16,
    /// Account user name.
    pub username: String,
    /// Account secret.
    pub password: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// [`Mailer`] backed by an async `lettre` SMTP transport.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    relay: String,
}

impl SmtpMailer {
    /// Creates a mailer for the given relay. No connection is made until the first send.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay's TLS parameters cannot be built.
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|e| {
                Error::invalid_config(format!("SMTP relay {}: {}", settings.host, e))
            })?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            relay: format!("{}:{}", settings.host, settings.port),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        let message = build_message(&mail)?;

        tracing::debug!(relay = %self.relay, to = %mail.to, "Sending email");
        let response = self.transport.send(message).await.map_err(Error::mail)?;
        tracing::debug!(code = %response.code(), "Relay accepted message");

        Ok(())
    }
}

/// Converts an [`OutgoingMail`] into a MIME message with an HTML body.
fn build_message(mail: &OutgoingMail) -> Result<Message> {
    let from: Mailbox = mail.from.parse().map_err(Error::mail)?;
    let to: Mailbox = mail.to.parse().map_err(Error::mail)?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(mail.html.clone())
        .map_err(Error::mail)
}
