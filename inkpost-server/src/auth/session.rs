//! Per-visitor sessions
//!
//! A logged-in visitor carries an opaque token in a signed cookie. The token
//! keys an entry in [`SessionStore`] holding the user id and when the session
//! was last used; entries idle for longer than the store's timeout are evicted.
//! Anonymous visitors have no entry at all.
//!
//! One-shot flash messages travel in their own signed cookie and are cleared
//! when read, so showing a message costs the server nothing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use sha2::{Digest, Sha512};
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use crate::db::User;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "inkpost_session";

/// Name of the cookie carrying a pending flash message
pub const FLASH_COOKIE: &str = "inkpost_flash";

/// Idle time after which a login is forgotten
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Derive the cookie signing key from the configured secret.
///
/// Any non-empty secret works; it is stretched to the 64 bytes the signer needs.
pub fn session_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

/// Returned when an operation needs a logged-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("authentication required")]
pub struct AuthRequired;

#[derive(Debug, Clone, Copy)]
struct SessionEntry {
    user_id: i64,
    last_seen: Instant,
}

/// Token-keyed login sessions
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionEntry>>>,
    idle_timeout: Duration,
    secure: bool,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self {
            inner: Arc::default(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            secure: false,
        }
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget sessions unused for longer than `idle_timeout`.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Mark cookies `Secure`, for sites served over HTTPS.
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Session token from the jar, if the cookie is present and its signature checks out.
    pub fn token(jar: &SignedCookieJar) -> Option<String> {
        jar.get(SESSION_COOKIE).map(|c| c.value().to_owned())
    }

    /// User bound to the jar's session. Counts as activity.
    pub async fn user_id(&self, jar: &SignedCookieJar) -> Option<i64> {
        let token = Self::token(jar)?;
        let now = Instant::now();
        let mut sessions = self.inner.write().await;

        let entry = sessions.get_mut(&token)?;
        if now.duration_since(entry.last_seen) > self.idle_timeout {
            let user_id = entry.user_id;
            sessions.remove(&token);
            tracing::debug!(user_id, "idle session expired");
            return None;
        }

        entry.last_seen = now;
        Some(entry.user_id)
    }

    /// Bind `user_id` to a fresh session and point the cookie at it.
    ///
    /// The previous token, if any, is discarded so a pre-login token can't be
    /// reused as an authenticated one.
    pub async fn login(&self, jar: SignedCookieJar, user_id: i64) -> SignedCookieJar {
        let now = Instant::now();
        let mut sessions = self.inner.write().await;
        if let Some(old) = Self::token(&jar) {
            sessions.remove(&old);
        }
        evict_idle(&mut sessions, now, self.idle_timeout);

        let token = new_token();
        sessions.insert(
            token.clone(),
            SessionEntry {
                user_id,
                last_seen: now,
            },
        );
        tracing::debug!(user_id, "session established");

        jar.add(self.cookie(SESSION_COOKIE, token))
    }

    /// Drop the jar's session entry and expire the cookie.
    pub async fn logout(&self, jar: SignedCookieJar) -> SignedCookieJar {
        if let Some(token) = Self::token(&jar) {
            if let Some(entry) = self.inner.write().await.remove(&token) {
                tracing::debug!(user_id = entry.user_id, "session ended");
            }
        }

        jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    }

    /// Remove every idle session, returning how many went.
    pub async fn sweep(&self) -> usize {
        let mut sessions = self.inner.write().await;
        let removed = evict_idle(&mut sessions, Instant::now(), self.idle_timeout);
        if removed > 0 {
            tracing::debug!(removed, remaining = sessions.len(), "swept idle sessions");
        }
        removed
    }

    /// Queue a message for the next page this visitor loads.
    pub fn set_flash(&self, jar: SignedCookieJar, message: impl Into<String>) -> SignedCookieJar {
        jar.add(self.cookie(FLASH_COOKIE, message.into()))
    }

    /// Take the pending flash message, expiring its cookie.
    pub fn take_flash(&self, jar: SignedCookieJar) -> (SignedCookieJar, Option<String>) {
        match jar.get(FLASH_COOKIE) {
            Some(cookie) => {
                let message = cookie.value().to_owned();
                (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), Some(message))
            }
            None => (jar, None),
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }
}

fn evict_idle(
    sessions: &mut HashMap<String, SessionEntry>,
    now: Instant,
    idle_timeout: Duration,
) -> usize {
    let before = sessions.len();
    sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= idle_timeout);
    before - sessions.len()
}

/// The identity attached to one request
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The logged-in user, or `AuthRequired`.
    pub fn require_authenticated(&self) -> Result<&User, AuthRequired> {
        self.user.as_ref().ok_or(AuthRequired)
    }
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jar() -> SignedCookieJar {
        SignedCookieJar::new(session_key("test-secret"))
    }

    fn user(id: i64) -> User {
        User {
            id,
            email: format!("u{id}@example.com"),
            password_hash: String::new(),
            name: format!("User {id}"),
        }
    }

    const HOUR: Duration = Duration::from_secs(60 * 60);

    #[tokio::test]
    async fn login_binds_user() {
        let store = SessionStore::new();
        let jar = store.login(jar(), 7).await;

        assert!(SessionStore::token(&jar).is_some());
        assert_eq!(store.user_id(&jar).await, Some(7));
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let store = SessionStore::new();
        let alice = store.login(jar(), 1).await;
        let bob = store.login(jar(), 2).await;

        assert_eq!(store.user_id(&alice).await, Some(1));
        assert_eq!(store.user_id(&bob).await, Some(2));

        let alice = store.logout(alice).await;
        assert_eq!(store.user_id(&alice).await, None);
        assert_eq!(store.user_id(&bob).await, Some(2));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn login_rotates_token() {
        let store = SessionStore::new();
        let first = store.login(jar(), 3).await;
        let before = SessionStore::token(&first).unwrap();

        let second = store.login(first, 3).await;
        let after = SessionStore::token(&second).unwrap();

        assert_ne!(before, after);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn flash_is_one_shot() {
        let store = SessionStore::new();
        let jar = store.set_flash(jar(), "Incorrect password.");

        let (jar, flash) = store.take_flash(jar);
        assert_eq!(flash.as_deref(), Some("Incorrect password."));
        let (_, flash) = store.take_flash(jar);
        assert_eq!(flash, None);
    }

    #[tokio::test]
    async fn anonymous_flash_keeps_no_server_state() {
        let store = SessionStore::new();

        for _ in 0..500 {
            let jar = store.set_flash(jar(), "Please login to continue.");
            assert!(SessionStore::token(&jar).is_none());
        }

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn flash_leaves_login_alone() {
        let store = SessionStore::new();
        let jar = store.login(jar(), 5).await;
        let token = SessionStore::token(&jar);

        let jar = store.set_flash(jar, "note");

        assert_eq!(SessionStore::token(&jar), token);
        assert_eq!(store.user_id(&jar).await, Some(5));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn no_cookie_means_no_user() {
        let store = SessionStore::new();
        assert_eq!(store.user_id(&jar()).await, None);
        assert_eq!(store.take_flash(jar()).1, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_session_expires() {
        let store = SessionStore::new().with_idle_timeout(HOUR);
        let jar = store.login(jar(), 8).await;

        tokio::time::advance(HOUR + Duration::from_secs(1)).await;

        assert_eq!(store.user_id(&jar).await, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn activity_keeps_session_alive() {
        let store = SessionStore::new().with_idle_timeout(HOUR);
        let jar = store.login(jar(), 9).await;

        for _ in 0..3 {
            tokio::time::advance(HOUR / 2).await;
            assert_eq!(store.user_id(&jar).await, Some(9));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_sessions_are_evicted() {
        let store = SessionStore::new().with_idle_timeout(HOUR);

        // Clients that drop their cookie without logging out.
        for id in 0..100 {
            store.login(jar(), id).await;
        }
        tokio::time::advance(HOUR / 2).await;
        let active = store.login(jar(), 500).await;

        tokio::time::advance(HOUR / 2 + Duration::from_secs(1)).await;
        assert_eq!(store.sweep().await, 100);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.user_id(&active).await, Some(500));

        // A later login also clears whatever has gone idle.
        tokio::time::advance(HOUR * 2).await;
        store.login(jar(), 501).await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn cookies_follow_secure_setting() {
        let plain = SessionStore::new().login(jar(), 1).await;
        assert_ne!(plain.get(SESSION_COOKIE).unwrap().secure(), Some(true));

        let store = SessionStore::new().with_secure_cookies(true);
        let jar = store.login(jar(), 1).await;
        let jar = store.set_flash(jar, "hi");

        assert_eq!(jar.get(SESSION_COOKIE).unwrap().secure(), Some(true));
        assert_eq!(jar.get(FLASH_COOKIE).unwrap().secure(), Some(true));
    }

    #[test]
    fn require_authenticated() {
        assert_eq!(
            Session::anonymous().require_authenticated().unwrap_err(),
            AuthRequired
        );

        let session = Session::authenticated(user(4));
        assert!(session.is_authenticated());
        assert_eq!(session.require_authenticated().unwrap().id, 4);
    }

    #[test]
    fn short_secrets_still_make_keys() {
        let a = session_key("x");
        let b = session_key("y");
        assert_ne!(a.signing(), b.signing());
    }
}
