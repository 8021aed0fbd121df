//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sqlx::SqlitePool;

use crate::auth::session::{session_key, SessionStore};
use crate::config::BlogConfig;
use crate::error::ServerResult;
use crate::notify::{Dispatcher, LogNotifier, Notifier, SmsNotifier, SmtpNotifier};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: SqlitePool,
    sessions: SessionStore,
    dispatcher: Dispatcher,
    cookie_key: Key,
    contact_recipient: String,
}

impl AppState {
    /// Assemble state from a ready pool and validated config.
    ///
    /// Mail goes through the SMTP relay unless `mail_log_only` is set.
    pub fn new(pool: SqlitePool, config: &BlogConfig) -> ServerResult<Self> {
        config.validate()?;

        let email: Arc<dyn Notifier> = if config.mail_log_only {
            tracing::warn!("mail is in log-only mode; contact messages will not be delivered");
            Arc::new(LogNotifier)
        } else {
            tracing::info!(
                host = %config.mail.host,
                port = config.mail.port,
                "SMTP relay configured"
            );
            Arc::new(SmtpNotifier::new(&config.mail, config.notify_timeout)?)
        };

        let mut dispatcher = Dispatcher::new(email, config.notify_timeout);
        if let Some(sms) = &config.sms {
            dispatcher = dispatcher.with_sms(Arc::new(SmsNotifier::new(sms, config.notify_timeout)?));
        }

        Ok(Self::with_dispatcher(pool, config, dispatcher))
    }

    /// Assemble state around an explicit dispatcher.
    pub fn with_dispatcher(pool: SqlitePool, config: &BlogConfig, dispatcher: Dispatcher) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                pool,
                sessions: SessionStore::new()
                    .with_idle_timeout(config.session_idle_timeout)
                    .with_secure_cookies(config.secure_cookies),
                dispatcher,
                cookie_key: session_key(&config.secret_key),
                contact_recipient: config.contact_recipient.clone(),
            }),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    pub fn contact_recipient(&self) -> &str {
        &self.inner.contact_recipient
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.inner.cookie_key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::test_pool;
    use crate::error::ServerError;
    use std::time::Duration;

    #[tokio::test]
    async fn mail_without_relay_is_refused() {
        let config = BlogConfig {
            mail_log_only: false,
            ..BlogConfig::for_tests()
        };

        assert!(matches!(
            AppState::new(test_pool().await, &config),
            Err(ServerError::Config(_))
        ));
    }

    #[tokio::test]
    async fn log_only_mail_must_be_asked_for() {
        let config = BlogConfig::for_tests();
        assert!(config.mail_log_only);
        assert!(AppState::new(test_pool().await, &config).is_ok());
    }

    #[tokio::test]
    async fn sessions_follow_config() {
        let config = BlogConfig {
            session_idle_timeout: Duration::from_secs(60 * 60),
            ..BlogConfig::for_tests()
        };
        let state = AppState::new(test_pool().await, &config).unwrap();

        assert_eq!(state.sessions().idle_timeout(), Duration::from_secs(60 * 60));
    }
}
