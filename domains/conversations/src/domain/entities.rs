//! Domain entities for the Conversations domain
//!
//! A `Conversation` belongs to one user and owns an ordered ledger of
//! `Message`s. Message order is the store-assigned `id`, never a timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chatwidget_common::{Error, Result};

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Conversation entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new conversation for `user_id`
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub conversation_id: Uuid,
    pub content: String,
    pub is_user_message: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl Message {
    pub fn role(&self) -> MessageRole {
        if self.is_user_message {
            MessageRole::User
        } else {
            MessageRole::Assistant
        }
    }
}

/// A message that has not yet been assigned an id by the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub conversation_id: Uuid,
    pub content: String,
    pub is_user_message: bool,
}

impl NewMessage {
    /// User-authored message; content must not be blank
    pub fn user(conversation_id: Uuid, content: String) -> Result<Self> {
        validate_user_content(&content)?;
        Ok(Self {
            conversation_id,
            content,
            is_user_message: true,
        })
    }

    /// Assistant-authored message, stored as returned by the gateway
    pub fn assistant(conversation_id: Uuid, content: String) -> Self {
        Self {
            conversation_id,
            content,
            is_user_message: false,
        }
    }
}

/// Reject empty or whitespace-only user content
pub fn validate_user_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(Error::Validation(
            "Message content must not be empty".to_string(),
        ));
    }
    Ok(())
}
