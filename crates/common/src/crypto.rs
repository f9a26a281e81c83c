//! Password hashing shared across crates
//!
//! Passwords are stored as bcrypt hashes. The cost factor and salt are
//! embedded in the hash string, so verification needs nothing else.

use crate::error::{Error, Result};

/// bcrypt work factor for newly hashed passwords
pub const PASSWORD_HASH_COST: u32 = bcrypt::DEFAULT_COST;

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, PASSWORD_HASH_COST).map_err(|e| {
        tracing::error!(error = %e, "Failed to hash password");
        Error::Internal("Failed to hash password".to_string())
    })
}

/// Verify a password against a stored bcrypt hash.
///
/// A malformed stored hash never verifies.
pub fn verify_password(candidate: &str, stored_hash: &str) -> bool {
    bcrypt::verify(candidate, stored_hash).unwrap_or(false)
}
