//! Domain entities for the accounts domain
//!
//! A `User` is created once at registration and never modified afterwards.

use chrono::{DateTime, Utc};
use chatwidget_common::{crypto, Error, Result};
use serde::Serialize;
use uuid::Uuid;

/// Maximum username length in characters
pub const MAX_USERNAME_LEN: usize = 150;

/// User entity
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user, hashing the password
    pub fn new(username: String, password: &str) -> Result<Self> {
        if username.trim().is_empty() {
            return Err(Error::Validation("Username must not be blank".to_string()));
        }

        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(Error::Validation(format!(
                "Username must be at most {} characters",
                MAX_USERNAME_LEN
            )));
        }

        if password.is_empty() {
            return Err(Error::Validation("Password must not be empty".to_string()));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            username,
            hashed_password: crypto::hash_password(password)?,
            created_at: Utc::now(),
        })
    }

    /// Check a candidate password against the stored hash
    pub fn verify_password(&self, candidate: &str) -> bool {
        crypto::verify_password(candidate, &self.hashed_password)
    }
}
