//! Password hashing and verification

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::LazyLock;

use crate::shared::AppError;

/// Hash of an empty password, verified against when the account doesn't exist
/// so that unknown identifiers cost as much as wrong passwords
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    Argon2::default()
        .hash_password(b"", &SaltString::generate(&mut OsRng))
        .map(|hash| hash.to_string())
        .unwrap_or_default()
});

/// Hashes a plaintext password with Argon2id and a random salt
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to hash password");
            AppError::Internal
        })
}

/// Checks a password against a stored PHC hash; Argon2 compares digests in constant time
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Hashes on the blocking pool so Argon2 doesn't stall the async workers
pub async fn spawn_hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing task failed");
            AppError::Internal
        })?
}

/// Verifies on the blocking pool. With no stored hash, the dummy hash is checked
/// instead so unknown accounts cost the same as wrong passwords, and the result is false.
pub async fn spawn_verify_password(
    password: String,
    stored_hash: Option<String>,
) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => verify_password(&password, &hash),
        None => {
            let _ = verify_password(&password, &DUMMY_HASH);
            false
        }
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Password verification task failed");
        AppError::Internal
    })
}
