//! Site configuration
//!
//! Assembled by the CLI from flags and environment variables
//! (see `inkpost serve --help`); nothing here reads the environment itself.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::session::DEFAULT_IDLE_TIMEOUT;
use crate::error::ServerError;

/// Default contact-form subject
pub const CONTACT_SUBJECT: &str = "Blog Message";

/// Runtime configuration for the site
#[derive(Clone)]
pub struct BlogConfig {
    /// Secret the session cookie signing key is derived from
    pub secret_key: String,
    /// Address contact-form messages are sent to
    pub contact_recipient: String,
    pub mail: MailSettings,
    /// Log contact messages instead of sending them
    pub mail_log_only: bool,
    /// Optional, never used by routes
    pub sms: Option<SmsSettings>,
    /// Upper bound for one notification send
    pub notify_timeout: Duration,
    /// Logins unused for this long are forgotten
    pub session_idle_timeout: Duration,
    /// Mark cookies `Secure` (site served over HTTPS)
    pub secure_cookies: bool,
}

impl BlogConfig {
    /// Check settings that would otherwise fail at request time.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.secret_key.trim().is_empty() {
            return Err(ServerError::Config("SECRET_KEY must not be empty".into()));
        }
        if self.contact_recipient.trim().is_empty() {
            return Err(ServerError::Config(
                "CONTACT_RECIPIENT must not be empty".into(),
            ));
        }
        if self.notify_timeout.is_zero() {
            return Err(ServerError::Config(
                "notification timeout must be positive".into(),
            ));
        }
        if self.session_idle_timeout.is_zero() {
            return Err(ServerError::Config(
                "session idle timeout must be positive".into(),
            ));
        }
        if !self.mail_log_only && self.mail.sender().is_none() {
            return Err(ServerError::Config(
                "no mail sender: set SMTP_USERNAME or MAIL_FROM, or enable MAIL_LOG_ONLY".into(),
            ));
        }
        Ok(())
    }

    /// Configuration for tests: log-only mail, fixed secret.
    pub fn for_tests() -> Self {
        Self {
            secret_key: "test-secret-key".into(),
            contact_recipient: "owner@example.com".into(),
            mail: MailSettings::default(),
            mail_log_only: true,
            sms: None,
            notify_timeout: Duration::from_secs(5),
            session_idle_timeout: DEFAULT_IDLE_TIMEOUT,
            secure_cookies: false,
        }
    }
}

impl fmt::Debug for BlogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlogConfig")
            .field("secret_key", &"<redacted>")
            .field("contact_recipient", &self.contact_recipient)
            .field("mail", &self.mail)
            .field("mail_log_only", &self.mail_log_only)
            .field("sms", &self.sms.is_some())
            .field("notify_timeout", &self.notify_timeout)
            .field("session_idle_timeout", &self.session_idle_timeout)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

/// How the SMTP connection is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmtpTls {
    /// TLS from the first byte (port 465)
    #[default]
    Implicit,
    /// Plaintext upgraded with STARTTLS (port 587)
    StartTls,
    /// No encryption; local relays only
    None,
}

impl FromStr for SmtpTls {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "implicit" | "tls" | "ssl" => Ok(Self::Implicit),
            "starttls" => Ok(Self::StartTls),
            "none" | "plain" => Ok(Self::None),
            other => Err(format!(
                "unknown SMTP TLS mode '{other}' (expected implicit, starttls or none)"
            )),
        }
    }
}

/// SMTP relay settings
#[derive(Clone)]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    pub tls: SmtpTls,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender address; defaults to `username`
    pub from: Option<String>,
}

impl MailSettings {
    /// Sender address: explicit `from`, else the login username.
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().or(self.username.as_deref())
    }
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".into(),
            port: 465,
            tls: SmtpTls::Implicit,
            username: None,
            password: None,
            from: None,
        }
    }
}

impl fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("from", &self.from)
            .finish()
    }
}

/// Twilio credentials for the SMS channel
#[derive(Clone)]
pub struct SmsSettings {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}
