//! Email channel: authenticated SMTP relay, or log-only when unconfigured

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use crate::config::{MailSettings, SmtpTls};
use crate::error::ServerError;

use super::{Channel, DeliveryFailed, Notifier};

/// Sends mail through an SMTP relay
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build the relay transport. No connection is opened until the first send.
    ///
    /// `timeout` bounds each SMTP command on the wire.
    pub fn new(settings: &MailSettings, timeout: Duration) -> Result<Self, ServerError> {
        let sender = settings
            .sender()
            .ok_or_else(|| ServerError::Config("SMTP sender address not set".into()))?;
        let from = sender
            .parse::<Mailbox>()
            .map_err(|e| ServerError::Config(format!("invalid SMTP sender '{sender}': {e}")))?;

        let builder = match settings.tls {
            SmtpTls::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host),
            SmtpTls::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            }
            SmtpTls::None => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
                &settings.host,
            )),
        }
        .map_err(|e| ServerError::Config(format!("failed to configure SMTP transport: {e}")))?
        .port(settings.port)
        .timeout(Some(timeout));

        let builder = match (&settings.username, &settings.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(
        &self,
        message: &str,
        recipient: &str,
        subject: &str,
    ) -> Result<Message, DeliveryFailed> {
        let to = recipient
            .parse::<Mailbox>()
            .map_err(|e| DeliveryFailed::invalid_message(Channel::Email, e))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(format!("Hello {subject}"))
            .header(ContentType::TEXT_PLAIN)
            .body(message.to_string())
            .map_err(|e| DeliveryFailed::invalid_message(Channel::Email, e))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn send(
        &self,
        message: &str,
        recipient: &str,
        subject: &str,
    ) -> Result<(), DeliveryFailed> {
        let email = self.build_message(message, recipient, subject)?;

        self.transport
            .send(email)
            .await
            .map_err(|e| DeliveryFailed::transport(Channel::Email, e))?;

        Ok(())
    }
}

/// Stand-in email channel that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn send(
        &self,
        message: &str,
        recipient: &str,
        subject: &str,
    ) -> Result<(), DeliveryFailed> {
        tracing::info!(
            recipient,
            subject,
            bytes = message.len(),
            "mail not configured; message logged instead of sent"
        );
        Ok(())
    }
}
