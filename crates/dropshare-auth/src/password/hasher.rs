//! Argon2id password hashing and verification.

use std::sync::OnceLock;

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use tracing::warn;

use dropshare_core::error::AppError;

/// Handles share password hashing and verification using Argon2id.
///
/// Both operations are deliberately slow; async callers should run them on
/// the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Creates a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hashes a plaintext password using Argon2id with a random salt.
    ///
    /// Returns a PHC string (`$argon2id$v=19$...`).
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a presented password against a stored hash.
    ///
    /// A missing password, a wrong password, and a hash that cannot be
    /// parsed all yield `false`. Every path runs one Argon2 verification so
    /// the answer takes the same time.
    pub fn verify_password(&self, password: Option<&str>, hash: &str) -> bool {
        let Some(password) = password else {
            self.burn_verification(b"");
            return false;
        };

        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Stored share password hash is malformed");
                self.burn_verification(password.as_bytes());
                return false;
            }
        };

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                warn!(error = %e, "Share password verification failed");
                false
            }
        }
    }

    /// Verify against a fixed hash and discard the result.
    fn burn_verification(&self, password: &[u8]) {
        let Some(hash) = dummy_hash() else {
            return;
        };
        if let Ok(parsed) = PasswordHash::new(hash) {
            let _ = Argon2::default().verify_password(password, &parsed);
        }
    }
}

/// Hash of a random secret, computed once with the default parameters.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(b"dropshare-placeholder", &salt)
                .ok()
                .map(|h| h.to_string())
        })
        .as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("secret").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password(Some("secret"), &hash));
        assert!(!hasher.verify_password(Some("wrong"), &hash));
        assert!(!hasher.verify_password(Some(""), &hash));
    }

    #[test]
    fn test_missing_password_fails() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("secret").unwrap();
        assert!(!hasher.verify_password(None, &hash));
    }

    #[test]
    fn test_malformed_hash_fails_without_panicking() {
        let hasher = PasswordHasher::new();
        assert!(!hasher.verify_password(Some("secret"), "not-a-phc-string"));
        assert!(!hasher.verify_password(Some("secret"), ""));
    }

    #[test]
    fn test_rejections_still_run_argon2() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("secret").unwrap();

        let time = |password: Option<&str>, hash: &str| {
            let started = std::time::Instant::now();
            assert!(!hasher.verify_password(password, hash));
            started.elapsed()
        };
        // Warm the placeholder hash so it is not timed.
        time(None, &hash);

        let wrong = time(Some("wrong"), &hash);
        let missing = time(None, &hash);
        let malformed = time(Some("secret"), "not-a-phc-string");
        assert!(missing * 4 >= wrong, "missing {missing:?} vs wrong {wrong:?}");
        assert!(malformed * 4 >= wrong, "malformed {malformed:?} vs wrong {wrong:?}");
    }

    #[test]
    fn test_salts_differ() {
        let hasher = PasswordHasher::new();
        let a = hasher.hash_password("same").unwrap();
        let b = hasher.hash_password("same").unwrap();
        assert_ne!(a, b);
    }
}
