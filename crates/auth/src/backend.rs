//! Concrete authentication backend
//!
//! Resolves the subject of a validated access token to a stored identity.
//! The lookup sits behind `IdentityStore` so the HTTP layer can be exercised
//! without a database.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::config::AuthConfig;
use crate::context::AuthContext;
use crate::error::AuthError;
use crate::types::AuthIdentity;

/// Read-side lookup of users by username
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<AuthIdentity>, AuthError>;
}

/// Postgres-backed identity lookup.
///
/// Uses runtime `sqlx::query_as` against the `users` table owned by the
/// accounts domain.
#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<AuthIdentity>, AuthError> {
        sqlx::query_as::<_, AuthIdentity>(
            r#"
            SELECT id, username, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, username = %username, "Failed to load user");
            AuthError::UserLoadError
        })
    }
}

/// Concrete authentication backend.
///
/// Domain states expose this via `FromRef`:
/// ```ignore
/// impl FromRef<MyDomainState> for AuthBackend {
///     fn from_ref(state: &MyDomainState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Clone)]
pub struct AuthBackend {
    identities: Arc<dyn IdentityStore>,
    config: AuthConfig,
}

impl AuthBackend {
    pub fn new(identities: Arc<dyn IdentityStore>, config: AuthConfig) -> Self {
        Self { identities, config }
    }

    pub fn postgres(pool: PgPool, config: AuthConfig) -> Self {
        Self::new(Arc::new(PgIdentityStore::new(pool)), config)
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Validate `token` and load the user it names
    pub async fn authenticate_jwt(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = crate::jwt::validate_access_token(token, &self.config)?;

        let user = self
            .identities
            .find_by_username(&claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::debug!(username = %claims.sub, "Token subject no longer exists");
                AuthError::UserNotFound
            })?;

        Ok(AuthContext::new(user))
    }
}
