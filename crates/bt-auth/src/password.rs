//! Password hashing and reset tokens
//!
//! Passwords are stored as Argon2 PHC strings. Reset tokens are random
//! strings handed to the user once; only their SHA-256 digest is kept.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

use crate::identity::AuthError;

const RESET_TOKEN_LENGTH: usize = 40;

/// Hash of a password no account has, checked when a login names an
/// unknown account so that it costs as much as a wrong password
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("no account has this password").ok());

/// Hash a plaintext password
pub fn hash_password(plaintext: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Internal(format!("password hashing failed: {}", e)))
}

/// Verify a plaintext password against a stored hash
pub fn verify_password(plaintext: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Spend one verification without a stored hash to check against; always
/// `false`
pub fn verify_without_account(plaintext: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        verify_password(plaintext, hash);
    }
    false
}

/// A freshly issued reset token: `token` goes to the user, `digest` to the store
#[derive(Debug, Clone)]
pub struct IssuedResetToken {
    pub token: String,
    pub digest: String,
}

pub fn issue_reset_token() -> IssuedResetToken {
    use rand::Rng;
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    let mut rng = rand::rng();
    let token: String = (0..RESET_TOKEN_LENGTH)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect();
    let digest = token_digest(&token);
    IssuedResetToken { token, digest }
}

/// Hex SHA-256 of a reset token
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.trim().as_bytes());
    hex::encode(hasher.finalize())
}
