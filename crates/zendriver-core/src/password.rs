//! Password hashing with bcrypt.
//!
//! Hashes embed their own salt and cost, so verification only needs the
//! stored hash string. Input longer than 72 bytes is never truncated:
//! hashing it fails and verifying it never matches.

use bcrypt::{hash, verify};

use crate::errors::AppError;

const BCRYPT_MAX_BYTES: usize = 72;

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    if password.len() > BCRYPT_MAX_BYTES {
        return Err(AppError::validation(format!(
            "password must be at most {} bytes",
            BCRYPT_MAX_BYTES
        )));
    }

    hash(password, cost)
        .map_err(|e| AppError::internal_error(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    if password.len() > BCRYPT_MAX_BYTES {
        return Ok(false);
    }

    verify(password, hash)
        .map_err(|e| AppError::internal_error(format!("Failed to verify password: {}", e)))
}
