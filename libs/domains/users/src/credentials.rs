//! Password hashing and reset tokens.
//!
//! Session tokens are issued by [`axum_helpers::JwtAuth`].

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};

use crate::error::{UserError, UserResult};

/// Bytes of entropy in a reset token, hex-encoded to twice as many characters
pub const RESET_TOKEN_BYTES: usize = 20;

pub fn reset_token_ttl() -> Duration {
    Duration::hours(1)
}

/// Argon2id hash in PHC string format with a fresh random salt
pub fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub fn generate_reset_token() -> String {
    let bytes: [u8; RESET_TOKEN_BYTES] = rand::random();
    const_hex::encode(bytes)
}

/// A reset token is usable strictly before its expiry
pub fn reset_token_valid(expires: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires.is_some_and(|expires| now < expires)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_differs_from_plaintext_and_verifies() {
        let hash = hash_password("Secret123").unwrap();

        assert_ne!(hash, "Secret123");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Secret123", &hash).unwrap());
        assert!(!verify_password("Secret124", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let first = hash_password("Secret123").unwrap();
        let second = hash_password("Secret123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("Secret123", "not-a-phc-string"),
            Err(UserError::PasswordHash(_))
        ));
    }

    #[test]
    fn test_reset_token_shape() {
        let token = generate_reset_token();
        assert_eq!(token.len(), RESET_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_reset_token());
    }

    #[test]
    fn test_reset_token_expiry() {
        let now = Utc::now();
        assert!(reset_token_valid(Some(now + reset_token_ttl()), now));
        assert!(!reset_token_valid(Some(now), now));
        assert!(!reset_token_valid(Some(now - Duration::seconds(1)), now));
        assert!(!reset_token_valid(None, now));
    }
}
