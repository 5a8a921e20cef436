//! Password value object.
//!
//! Argon2id hashing for staff credentials. Plain text never leaves this
//! module except as the caller's own input.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

/// Hash verified against when the account does not exist, so a failed
/// login costs the same whether or not the email is known.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"not-a-real-password", &salt)
        .map(|h| h.to_string())
        .unwrap_or_default()
});

/// Hashed password
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

// Never print the hash
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash a new password.
    ///
    /// # Errors
    /// Validation error if shorter than the minimum length.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH as usize {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?
            .to_string();
        Ok(Self { hash })
    }

    /// Wrap a stored hash.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    /// Stand-in used for unknown accounts.
    pub fn dummy() -> Self {
        Self::from_hash(DUMMY_HASH.as_str())
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn into_string(self) -> String {
        self.hash
    }

    /// A malformed stored hash never verifies.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored password hash is malformed: {}", e);
                false
            }
        }
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let password = Password::new("SecurePassword123!").unwrap();
        assert!(password.verify("SecurePassword123!"));
        assert!(!password.verify("WrongPassword123"));
    }

    #[test]
    fn test_password_from_hash() {
        let hash = Password::new("TestPassword123").unwrap().into_string();
        assert!(Password::from_hash(hash).verify("TestPassword123"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = Password::new("SamePassword123").unwrap();
        let b = Password::new("SamePassword123").unwrap();
        assert_ne!(a.as_str(), b.as_str());
        assert!(a.verify("SamePassword123"));
        assert!(b.verify("SamePassword123"));
    }

    #[test]
    fn test_password_length_boundary() {
        assert!(Password::new("short").is_err());
        assert!(Password::new("12345678").is_ok());
    }

    #[test]
    fn test_dummy_and_malformed_never_verify() {
        assert!(!Password::dummy().verify("not-the-password"));
        assert!(!Password::from_hash("garbage").verify("anything"));
    }
}
