//! SMS channel over the Twilio REST API

use std::time::Duration;

use async_trait::async_trait;

use crate::config::SmsSettings;
use crate::error::ServerError;

use super::{Channel, DeliveryFailed, Notifier};

const TWILIO_API: &str = "https://api.twilio.com";

/// Sends text messages from a fixed Twilio number
pub struct SmsNotifier {
    client: reqwest::Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl SmsNotifier {
    pub fn new(settings: &SmsSettings, timeout: Duration) -> Result<Self, ServerError> {
        Self::with_base_url(settings, timeout, TWILIO_API)
    }

    /// Point the client at a different API host.
    pub fn with_base_url(
        settings: &SmsSettings,
        timeout: Duration,
        base_url: &str,
    ) -> Result<Self, ServerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServerError::Config(format!("failed to build SMS client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            account_sid: settings.account_sid.clone(),
            auth_token: settings.auth_token.clone(),
            from_number: settings.from_number.clone(),
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }
}

#[async_trait]
impl Notifier for SmsNotifier {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    /// Subjects have no place in a text message and are dropped.
    async fn send(
        &self,
        message: &str,
        recipient: &str,
        _subject: &str,
    ) -> Result<(), DeliveryFailed> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("Body", message),
                ("From", self.from_number.as_str()),
                ("To", recipient),
            ])
            .send()
            .await
            .map_err(|e| DeliveryFailed::transport(Channel::Sms, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryFailed::transport(
                Channel::Sms,
                format!("provider responded {status}"),
            ));
        }

        Ok(())
    }
}
