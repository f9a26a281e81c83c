//! User repository

use async_trait::async_trait;
use chatwidget_common::RepositoryError;
use sqlx::PgPool;

use crate::domain::entities::User;

/// Credential store
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// Insert a new user. A taken username is `RepositoryError::AlreadyExists`.
    async fn create(&self, user: &User) -> Result<User, RepositoryError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, hashed_password, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, hashed_password, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, hashed_password, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.hashed_password)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from_insert)
    }
}
