//! Notification dispatch for contact-form messages
//!
//! One send attempt over email, bounded by a timeout. Every failure mode
//! (connection refused, dropped connection, TLS, auth, bad address, timeout)
//! comes back as [`DeliveryFailed`]; nothing is retried or queued.
//!
//! An SMS channel can be configured but routes never send through it.

pub mod email;
pub mod sms;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

pub use email::{LogNotifier, SmtpNotifier};
pub use sms::SmsNotifier;

/// Delivery channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    Sms,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::Sms => f.write_str("sms"),
        }
    }
}

/// The transport accepted the message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivered {
    pub channel: Channel,
}

/// The message was not handed off
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryFailed {
    #[error("{channel} delivery timed out after {timeout:?}")]
    Timeout { channel: Channel, timeout: Duration },

    #[error("{channel} transport error: {reason}")]
    Transport { channel: Channel, reason: String },

    #[error("{channel} message rejected before sending: {reason}")]
    InvalidMessage { channel: Channel, reason: String },
}

impl DeliveryFailed {
    pub fn transport(channel: Channel, reason: impl fmt::Display) -> Self {
        Self::Transport {
            channel,
            reason: reason.to_string(),
        }
    }

    pub fn invalid_message(channel: Channel, reason: impl fmt::Display) -> Self {
        Self::InvalidMessage {
            channel,
            reason: reason.to_string(),
        }
    }
}

/// A single outbound channel
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    fn channel(&self) -> Channel;

    async fn send(&self, message: &str, recipient: &str, subject: &str)
        -> Result<(), DeliveryFailed>;
}

/// Routes messages to the email channel, holding the dormant SMS channel
#[derive(Clone)]
pub struct Dispatcher {
    email: Arc<dyn Notifier>,
    sms: Option<Arc<dyn Notifier>>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(email: Arc<dyn Notifier>, timeout: Duration) -> Self {
        Self {
            email,
            sms: None,
            timeout,
        }
    }

    pub fn with_sms(mut self, sms: Arc<dyn Notifier>) -> Self {
        self.sms = Some(sms);
        self
    }

    /// Configured SMS channel. Not used by any route.
    pub fn sms(&self) -> Option<&Arc<dyn Notifier>> {
        self.sms.as_ref()
    }

    /// Send `message` to `recipient` by email.
    pub async fn notify(
        &self,
        message: &str,
        recipient: &str,
        subject: &str,
    ) -> Result<Delivered, DeliveryFailed> {
        send_with_timeout(self.email.as_ref(), self.timeout, message, recipient, subject).await
    }
}

async fn send_with_timeout(
    notifier: &dyn Notifier,
    timeout: Duration,
    message: &str,
    recipient: &str,
    subject: &str,
) -> Result<Delivered, DeliveryFailed> {
    let channel = notifier.channel();

    let outcome = match tokio::time::timeout(timeout, notifier.send(message, recipient, subject)).await {
        Ok(result) => result,
        Err(_) => Err(DeliveryFailed::Timeout { channel, timeout }),
    };

    match outcome {
        Ok(()) => {
            tracing::info!(%channel, subject, "notification delivered");
            Ok(Delivered { channel })
        }
        Err(e) => {
            tracing::warn!(%channel, subject, error = %e, "notification failed");
            Err(e)
        }
    }
}
