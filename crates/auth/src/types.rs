//! Auth read-model types
//!
//! Lightweight view of the `users` rows owned by the accounts domain.
//! Carries only what authentication needs; never the password hash.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identity of an authenticated user
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AuthIdentity {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}
