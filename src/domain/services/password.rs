use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use crate::error::AppError;

pub const MIN_PASSWORD_LEN: u64 = 6;

/// Argon2 hash with the default cost parameters that matches no password.
/// Verified against when a login names an unknown email.
pub const UNMATCHABLE_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$90gBYQLvmgy7g7Toh+JKyw$auq/qdM95PrtvBhuo7IkVpFiRZMWIUjL1xhZ+QSU+5s";

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::InternalWithMsg(format!("password hashing failed: {e}")))
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::InternalWithMsg(format!("invalid stored hash: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::InternalWithMsg(format!("password verification failed: {e}"))),
    }
}
