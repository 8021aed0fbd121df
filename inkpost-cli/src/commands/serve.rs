//! HTTP server command
//!
//! Every setting can come from a flag or its environment variable; a `.env`
//! file in the working directory is loaded first.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use inkpost_server::config::{BlogConfig, MailSettings, SmsSettings, SmtpTls};
use inkpost_server::db::create_pool;
use inkpost_server::http::{run_server, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "INKPOST_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// SQLite database file (created if missing)
    #[arg(long, env = "INKPOST_DB_PATH", default_value = "posts.db")]
    pub db_path: PathBuf,

    /// Secret used to sign session cookies
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// SMTP relay host
    #[arg(long, env = "SMTP_HOST", default_value = "smtp.gmail.com")]
    pub smtp_host: String,

    /// SMTP relay port
    #[arg(long, env = "SMTP_PORT", default_value_t = 465)]
    pub smtp_port: u16,

    /// SMTP connection security: implicit, starttls or none
    #[arg(long, env = "SMTP_TLS", default_value = "implicit")]
    pub smtp_tls: SmtpTls,

    /// SMTP login; mail is only logged when unset
    #[arg(long, env = "SMTP_USERNAME")]
    pub smtp_username: Option<String>,

    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,

    /// Sender address (defaults to the SMTP login)
    #[arg(long, env = "MAIL_FROM")]
    pub mail_from: Option<String>,

    /// Log contact messages instead of sending them (no SMTP relay needed)
    #[arg(long, env = "MAIL_LOG_ONLY")]
    pub mail_log_only: bool,

    /// Address contact-form messages are delivered to
    #[arg(long, env = "CONTACT_RECIPIENT")]
    pub contact_recipient: String,

    /// Upper bound for one notification send, in seconds
    #[arg(long, env = "NOTIFY_TIMEOUT_SECS", default_value_t = 10)]
    pub notify_timeout: u64,

    /// Hours a login may sit unused before it is forgotten
    #[arg(long, env = "SESSION_IDLE_HOURS", default_value_t = 168)]
    pub session_idle_hours: u64,

    /// Mark cookies Secure; use when the site is served over HTTPS
    #[arg(long, env = "SECURE_COOKIES")]
    pub secure_cookies: bool,

    /// Twilio account SID (SMS channel)
    #[arg(long, env = "TWILIO_ACCOUNT_SID")]
    pub twilio_account_sid: Option<String>,

    #[arg(long, env = "TWILIO_AUTH_TOKEN", hide_env_values = true)]
    pub twilio_auth_token: Option<String>,

    /// Twilio sending number
    #[arg(long, env = "TWILIO_FROM")]
    pub twilio_from: Option<String>,
}

impl ServeArgs {
    fn blog_config(&self) -> BlogConfig {
        let sms = match (
            &self.twilio_account_sid,
            &self.twilio_auth_token,
            &self.twilio_from,
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(SmsSettings {
                account_sid: account_sid.clone(),
                auth_token: auth_token.clone(),
                from_number: from_number.clone(),
            }),
            _ => None,
        };

        BlogConfig {
            secret_key: self.secret_key.clone(),
            contact_recipient: self.contact_recipient.clone(),
            mail: MailSettings {
                host: self.smtp_host.clone(),
                port: self.smtp_port,
                tls: self.smtp_tls,
                username: self.smtp_username.clone(),
                password: self.smtp_password.clone(),
                from: self.mail_from.clone(),
            },
            mail_log_only: self.mail_log_only,
            sms,
            notify_timeout: Duration::from_secs(self.notify_timeout),
            session_idle_timeout: Duration::from_secs(self.session_idle_hours * 60 * 60),
            secure_cookies: self.secure_cookies,
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let blog_config = args.blog_config();
    blog_config.validate().context("Invalid configuration")?;
    tracing::debug!(config = ?blog_config, "configuration loaded");

    tracing::info!("Starting inkpost on {}", args.bind);

    let pool = create_pool(&args.db_path)
        .await
        .with_context(|| format!("Failed to open database {}", args.db_path.display()))?;

    let config = ServerConfig {
        bind_addr: args.bind,
        request_timeout: Duration::from_secs(args.timeout),
    };

    // Run server (blocks until shutdown)
    run_server(pool, &blog_config, config)
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ServeArgs,
    }

    fn parse(extra: &[&str]) -> ServeArgs {
        let mut argv = vec![
            "inkpost",
            "--secret-key",
            "s3cret",
            "--contact-recipient",
            "owner@example.com",
        ];
        argv.extend_from_slice(extra);
        Harness::parse_from(argv).args
    }

    #[test]
    fn sms_needs_every_twilio_setting() {
        let partial = parse(&["--twilio-account-sid", "AC1", "--twilio-from", "+1555"]);
        assert!(partial.blog_config().sms.is_none());

        let full = parse(&[
            "--twilio-account-sid",
            "AC1",
            "--twilio-auth-token",
            "tok",
            "--twilio-from",
            "+1555",
        ]);
        assert!(full.blog_config().sms.is_some());
    }

    #[test]
    fn mail_settings_carry_over() {
        let args = parse(&[
            "--smtp-tls",
            "starttls",
            "--smtp-port",
            "587",
            "--smtp-username",
            "me@example.com",
        ]);
        let config = args.blog_config();

        assert_eq!(config.mail.tls, SmtpTls::StartTls);
        assert_eq!(config.mail.port, 587);
        assert_eq!(config.notify_timeout, Duration::from_secs(10));
        assert!(!config.mail_log_only);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_relay_needs_log_only_opt_in() {
        assert!(parse(&[]).blog_config().validate().is_err());

        let config = parse(&["--mail-log-only"]).blog_config();
        assert!(config.mail_log_only);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn session_settings() {
        let config = parse(&["--session-idle-hours", "2", "--secure-cookies"]).blog_config();

        assert_eq!(config.session_idle_timeout, Duration::from_secs(2 * 60 * 60));
        assert!(config.secure_cookies);
        assert!(!parse(&[]).blog_config().secure_cookies);
    }
}
