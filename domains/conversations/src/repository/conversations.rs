//! Conversation repository

use async_trait::async_trait;
use chatwidget_common::RepositoryError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::Conversation;

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Find conversation by ID
    async fn find(&self, id: Uuid) -> Result<Option<Conversation>, RepositoryError>;

    /// The user's conversation: the earliest created one, if any
    async fn find_for_user(&self, user_id: Uuid) -> Result<Option<Conversation>, RepositoryError>;

    async fn create(&self, conv: &Conversation) -> Result<Conversation, RepositoryError>;

    /// Hard-delete every conversation of the user and all their messages.
    /// Returns the number of conversations removed.
    async fn delete_for_user(&self, user_id: Uuid) -> Result<u64, RepositoryError>;
}

#[derive(Clone)]
pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    async fn find(&self, id: Uuid) -> Result<Option<Conversation>, RepositoryError> {
        let conv = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, user_id, created_at
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conv)
    }

    async fn find_for_user(&self, user_id: Uuid) -> Result<Option<Conversation>, RepositoryError> {
        let conv = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, user_id, created_at
            FROM conversations
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conv)
    }

    async fn create(&self, conv: &Conversation) -> Result<Conversation, RepositoryError> {
        let created = sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (id, user_id, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, created_at
            "#,
        )
        .bind(conv.id)
        .bind(conv.user_id)
        .bind(conv.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from_insert)?;

        Ok(created)
    }

    async fn delete_for_user(&self, user_id: Uuid) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM messages
            WHERE conversation_id IN (SELECT id FROM conversations WHERE user_id = $1)
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM conversations WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }
}
