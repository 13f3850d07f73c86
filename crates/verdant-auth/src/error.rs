//! Authentication errors.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid credentials provided.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Session not found.
    #[error("session not found")]
    SessionNotFound,

    /// Session expired.
    #[error("session expired")]
    SessionExpired,

    /// Stored password hash is not a valid PHC string.
    #[error("malformed password hash: {0}")]
    MalformedHash(String),

    /// Password too weak.
    #[error("password too weak: {0}")]
    WeakPassword(String),

    /// Cache error.
    #[error("cache error: {0}")]
    Cache(#[from] verdant_cache::CacheError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials | AuthError::SessionNotFound | AuthError::SessionExpired
        )
    }
}
