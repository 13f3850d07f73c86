//! Opaque session tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bearer token handed to an admin after login.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    const PREFIX: &'static str = "vadm_";

    /// Generate a new cryptographically secure token.
    pub fn generate() -> Self {
        let bytes: [u8; 32] = rand::thread_rng().gen();
        Self(format!("{}{}", Self::PREFIX, URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Wrap a token presented by a caller.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token has the shape [`Self::generate`] produces.
    pub fn is_well_formed(&self) -> bool {
        self.0
            .strip_prefix(Self::PREFIX)
            .and_then(|body| URL_SAFE_NO_PAD.decode(body).ok())
            .is_some_and(|bytes| bytes.len() == 32)
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Only a prefix is printed so tokens stay out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown: String = self.0.chars().take(Self::PREFIX.len() + 4).collect();
        write!(f, "SessionToken({shown}…)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique_and_well_formed() {
        let a = SessionToken::generate();
        let b = SessionToken::generate();
        assert_ne!(a, b);
        assert!(a.is_well_formed());
        assert!(a.as_str().starts_with("vadm_"));
    }

    #[test]
    fn test_foreign_token_is_not_well_formed() {
        assert!(!SessionToken::new("admin").is_well_formed());
        assert!(!SessionToken::new("vadm_short").is_well_formed());
    }

    #[test]
    fn test_debug_hides_token() {
        let token = SessionToken::generate();
        let debug = format!("{token:?}");
        assert!(!debug.contains(token.as_str()));
    }
}
