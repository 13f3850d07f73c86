//! Password hashing with Argon2id.

use crate::AuthError;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;

/// Hashes and verifies admin passwords.
///
/// Hashes are PHC strings (`$argon2id$v=19$...`) so parameters travel with
/// the hash and can be tightened later without breaking stored values.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        let salt =
            SaltString::encode_b64(&bytes).map_err(|e| AuthError::Internal(e.to_string()))?;
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored PHC hash.
    ///
    /// A wrong password is `Ok(false)`; an unreadable hash is an error.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| AuthError::MalformedHash(e.to_string()))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Internal(e.to_string())),
        }
    }

    /// Validate password strength.
    pub fn validate_password(password: &str) -> Result<(), AuthError> {
        if password.chars().count() < 10 {
            return Err(AuthError::WeakPassword(
                "Password must be at least 10 characters".to_string(),
            ));
        }

        let has_upper = password.chars().any(|c| c.is_uppercase());
        let has_lower = password.chars().any(|c| c.is_lowercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());

        if !has_upper || !has_lower || !has_digit {
            return Err(AuthError::WeakPassword(
                "Password must contain uppercase, lowercase, and numbers".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let password = "Tulsi-Admin-2026";

        let hash = hasher.hash(password).unwrap();
        assert!(hash.starts_with("$argon2id$"));

        assert!(hasher.verify(password, &hash).unwrap());
        assert!(!hasher.verify("tulsi-admin-2026", &hash).unwrap());
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let hasher = PasswordHasher::new();
        let hash1 = hasher.hash("SamePassword1").unwrap();
        let hash2 = hasher.hash("SamePassword1").unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify("SamePassword1", &hash1).unwrap());
        assert!(hasher.verify("SamePassword1", &hash2).unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        let hasher = PasswordHasher::new();
        assert!(matches!(
            hasher.verify("anything", "admin123"),
            Err(AuthError::MalformedHash(_))
        ));
    }

    #[test]
    fn test_password_validation() {
        assert!(PasswordHasher::validate_password("SecurePass12").is_ok());
        assert!(PasswordHasher::validate_password("Short1").is_err());
        assert!(PasswordHasher::validate_password("alllowercase1").is_err());
        assert!(PasswordHasher::validate_password("NoNumbersHere").is_err());
    }
}
