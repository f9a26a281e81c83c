//! Authorization context for authenticated users

use uuid::Uuid;

use crate::types::AuthIdentity;

/// Represents an authenticated user context
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: AuthIdentity,
}

impl AuthContext {
    /// Create new auth context for a user
    pub fn new(user: AuthIdentity) -> Self {
        Self { user }
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }
}
