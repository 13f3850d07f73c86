//! Admin sessions and the authority that issues them.

use crate::{AuthError, PasswordHasher, SessionToken};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use verdant_cache::{cache_key, Cache};
use verdant_commerce::orders::AdminCapability;

const NAMESPACE: &str = "admin_session";

/// An authenticated admin session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub token: SessionToken,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Default session duration: 8 hours.
    pub const DEFAULT_DURATION_MINUTES: i64 = 8 * 60;

    fn start(username: &str, duration: Duration) -> Self {
        let now = Utc::now();
        Self {
            token: SessionToken::generate(),
            username: username.to_string(),
            created_at: now,
            expires_at: now + duration,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl AdminCapability for AuthSession {
    fn is_authorized(&self) -> bool {
        !self.is_expired()
    }
}

/// Admin credentials as configured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct AdminCredentials {
    pub username: String,
    /// Argon2 PHC hash; produce one with `verdant admin hash-password`.
    pub password_hash: String,
    pub session_minutes: Option<i64>,
}

/// Checks credentials and issues sessions stored in a [`Cache`].
///
/// The commerce core only sees the resulting [`AdminCapability`].
pub struct AdminAuthority {
    credentials: AdminCredentials,
    hasher: PasswordHasher,
    cache: Arc<Cache>,
}

impl AdminAuthority {
    pub fn new(credentials: AdminCredentials, cache: Arc<Cache>) -> Self {
        Self {
            credentials,
            hasher: PasswordHasher::new(),
            cache,
        }
    }

    fn session_duration(&self) -> Duration {
        Duration::minutes(
            self.credentials
                .session_minutes
                .unwrap_or(AuthSession::DEFAULT_DURATION_MINUTES)
                .max(1),
        )
    }

    /// Verify credentials and start a session.
    pub fn login(&self, username: &str, password: &str) -> Result<AuthSession, AuthError> {
        if self.credentials.username.is_empty() || self.credentials.password_hash.is_empty() {
            warn!("admin login attempted with no admin configured");
            return Err(AuthError::InvalidCredentials);
        }
        let password_ok = self.hasher.verify(password, &self.credentials.password_hash)?;
        if username.trim() != self.credentials.username || !password_ok {
            warn!(username, "admin login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let session = AuthSession::start(&self.credentials.username, self.session_duration());
        self.cache
            .set(&cache_key!(NAMESPACE, session.token), &session)?;
        info!(username, expires_at = %session.expires_at, "admin session started");
        Ok(session)
    }

    /// Resolve a presented token to a live session.
    pub fn authorize(&self, token: &SessionToken) -> Result<AuthSession, AuthError> {
        if !token.is_well_formed() {
            return Err(AuthError::SessionNotFound);
        }
        let key = cache_key!(NAMESPACE, token);
        let session: AuthSession = self.cache.get(&key)?.ok_or(AuthError::SessionNotFound)?;
        if session.is_expired() {
            self.cache.delete(&key)?;
            return Err(AuthError::SessionExpired);
        }
        Ok(session)
    }

    /// End a session. Unknown tokens are ignored.
    pub fn logout(&self, token: &SessionToken) -> Result<(), AuthError> {
        self.cache.delete(&cache_key!(NAMESPACE, token))?;
        Ok(())
    }
}
