//! Password hashing and verification.
//!
//! Uses Argon2id in PHC string format. The salt is generated per hash,
//! so verification needs nothing beyond the stored string. Verification
//! is deliberately infallible from the caller's point of view: a
//! malformed or empty stored hash verifies as `false`, never as an
//! error the login path would have to special-case.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::StoreError;

/// Hash a password with Argon2id, returning the PHC string to store.
pub fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::Query(format!("password hashing failed: {}", e)))
}

/// Verify a password against a stored PHC-format hash.
///
/// Returns `false` for wrong passwords and for hashes that fail to
/// parse. The comparison inside Argon2 is constant-time over the
/// derived key.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery staple", &hash));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let hash = hash_password("s3cret-passphrase").unwrap();
        assert!(!verify_password("s3cret-passphrase2", &hash));
        assert!(!verify_password("", &hash));
    }

    #[test]
    fn test_malformed_hash_rejected() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password-here").unwrap();
        let b = hash_password("same-password-here").unwrap();
        assert_ne!(a, b);
    }
}
