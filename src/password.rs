use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::AppError;

/// Hashes a plaintext password with Argon2id and a fresh random salt.
pub fn hash(plain: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hashed| hashed.to_string())
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Verifies a plaintext password against a stored hash. Any parse or
/// verification failure counts as a mismatch.
pub fn verify(plain: &str, hashed: &str) -> bool {
    PasswordHash::new(hashed)
        .map(|parsed| Argon2::default().verify_password(plain.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hashed = hash("correct horse battery staple").unwrap();
        assert_ne!(hashed, "correct horse battery staple");
        assert!(verify("correct horse battery staple", &hashed));
        assert!(!verify("wrong password", &hashed));
    }

    #[test]
    fn salts_are_unique_per_hash() {
        let a = hash("same input").unwrap();
        let b = hash("same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify("anything", "not-a-phc-string"));
    }
}
