//! Message repository
//!
//! All orderings are by `id`. `updated_at` changes on edit and must not
//! affect which message counts as "next".

use async_trait::async_trait;
use chatwidget_common::RepositoryError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Message, NewMessage};

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID, deleted or not
    async fn find(&self, id: i64) -> Result<Option<Message>, RepositoryError>;

    /// Append a message; the store assigns the next id
    async fn append(&self, msg: &NewMessage) -> Result<Message, RepositoryError>;

    /// Non-deleted messages of a conversation in id order
    async fn list_active(&self, conversation_id: Uuid) -> Result<Vec<Message>, RepositoryError>;

    /// Every message with `id <= last_id`, including soft-deleted ones, in id order
    async fn list_through(
        &self,
        conversation_id: Uuid,
        last_id: i64,
    ) -> Result<Vec<Message>, RepositoryError>;

    /// First assistant message after `after_id` in the same conversation
    async fn find_paired_reply(
        &self,
        conversation_id: Uuid,
        after_id: i64,
    ) -> Result<Option<Message>, RepositoryError>;

    /// Overwrite content and bump `updated_at`
    async fn update_content(&self, id: i64, content: &str) -> Result<Message, RepositoryError>;

    async fn soft_delete(&self, id: i64) -> Result<(), RepositoryError>;
}

const MESSAGE_COLUMNS: &str =
    "id, conversation_id, content, is_user_message, created_at, updated_at, is_deleted";

#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn find(&self, id: i64) -> Result<Option<Message>, RepositoryError> {
        let msg = sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(msg)
    }

    async fn append(&self, msg: &NewMessage) -> Result<Message, RepositoryError> {
        let created = sqlx::query_as::<_, Message>(&format!(
            r#"
            INSERT INTO messages (conversation_id, content, is_user_message,
                                  created_at, updated_at, is_deleted)
            VALUES ($1, $2, $3, NOW(), NOW(), FALSE)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(msg.conversation_id)
        .bind(&msg.content)
        .bind(msg.is_user_message)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list_active(&self, conversation_id: Uuid) -> Result<Vec<Message>, RepositoryError> {
        let messages = sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE conversation_id = $1 AND is_deleted = FALSE
            ORDER BY id ASC
            "#
        ))
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn list_through(
        &self,
        conversation_id: Uuid,
        last_id: i64,
    ) -> Result<Vec<Message>, RepositoryError> {
        let messages = sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE conversation_id = $1 AND id <= $2
            ORDER BY id ASC
            "#
        ))
        .bind(conversation_id)
        .bind(last_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn find_paired_reply(
        &self,
        conversation_id: Uuid,
        after_id: i64,
    ) -> Result<Option<Message>, RepositoryError> {
        let reply = sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE conversation_id = $1 AND id > $2 AND is_user_message = FALSE
            ORDER BY id ASC
            LIMIT 1
            "#
        ))
        .bind(conversation_id)
        .bind(after_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reply)
    }

    async fn update_content(&self, id: i64, content: &str) -> Result<Message, RepositoryError> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            UPDATE messages SET
                content = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    async fn soft_delete(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE messages SET is_deleted = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
