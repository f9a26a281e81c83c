//! In-memory conversation store for tests
//!
//! One store implements both repository traits so messages and
//! conversations share a single id sequence and cascade on delete.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chatwidget_common::RepositoryError;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::{Conversation, Message, NewMessage};
use crate::repository::{ConversationRepository, MessageRepository};

#[derive(Debug, Default)]
struct Inner {
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    last_message_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every stored message, deleted or not, in id order
    pub fn all_messages(&self) -> Vec<Message> {
        self.read().messages.clone()
    }

    pub fn conversations_for(&self, user_id: Uuid) -> Vec<Conversation> {
        self.read()
            .conversations
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationStore {
    async fn find(&self, id: Uuid) -> Result<Option<Conversation>, RepositoryError> {
        Ok(self.read().conversations.iter().find(|c| c.id == id).cloned())
    }

    async fn find_for_user(&self, user_id: Uuid) -> Result<Option<Conversation>, RepositoryError> {
        Ok(self
            .read()
            .conversations
            .iter()
            .filter(|c| c.user_id == user_id)
            .min_by_key(|c| c.created_at)
            .cloned())
    }

    async fn create(&self, conv: &Conversation) -> Result<Conversation, RepositoryError> {
        let mut inner = self.write();
        if inner.conversations.iter().any(|c| c.id == conv.id) {
            return Err(RepositoryError::AlreadyExists);
        }
        inner.conversations.push(conv.clone());
        Ok(conv.clone())
    }

    async fn delete_for_user(&self, user_id: Uuid) -> Result<u64, RepositoryError> {
        let mut inner = self.write();

        let doomed: Vec<Uuid> = inner
            .conversations
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.id)
            .collect();

        inner
            .messages
            .retain(|m| !doomed.contains(&m.conversation_id));
        inner.conversations.retain(|c| c.user_id != user_id);

        Ok(doomed.len() as u64)
    }
}

#[async_trait]
impl MessageRepository for InMemoryConversationStore {
    async fn find(&self, id: i64) -> Result<Option<Message>, RepositoryError> {
        Ok(self.read().messages.iter().find(|m| m.id == id).cloned())
    }

    async fn append(&self, msg: &NewMessage) -> Result<Message, RepositoryError> {
        let mut inner = self.write();

        if !inner
            .conversations
            .iter()
            .any(|c| c.id == msg.conversation_id)
        {
            return Err(RepositoryError::NotFound);
        }

        inner.last_message_id += 1;
        let now = Utc::now();
        let created = Message {
            id: inner.last_message_id,
            conversation_id: msg.conversation_id,
            content: msg.content.clone(),
            is_user_message: msg.is_user_message,
            created_at: now,
            updated_at: now,
            is_deleted: false,
        };
        inner.messages.push(created.clone());
        Ok(created)
    }

    async fn list_active(&self, conversation_id: Uuid) -> Result<Vec<Message>, RepositoryError> {
        Ok(self
            .read()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id && !m.is_deleted)
            .cloned()
            .collect())
    }

    async fn list_through(
        &self,
        conversation_id: Uuid,
        last_id: i64,
    ) -> Result<Vec<Message>, RepositoryError> {
        Ok(self
            .read()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id && m.id <= last_id)
            .cloned()
            .collect())
    }

    async fn find_paired_reply(
        &self,
        conversation_id: Uuid,
        after_id: i64,
    ) -> Result<Option<Message>, RepositoryError> {
        Ok(self
            .read()
            .messages
            .iter()
            .find(|m| m.conversation_id == conversation_id && m.id > after_id && !m.is_user_message)
            .cloned())
    }

    async fn update_content(&self, id: i64, content: &str) -> Result<Message, RepositoryError> {
        let mut inner = self.write();
        let msg = inner
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(RepositoryError::NotFound)?;

        msg.content = content.to_string();
        msg.updated_at = Utc::now();
        Ok(msg.clone())
    }

    async fn soft_delete(&self, id: i64) -> Result<(), RepositoryError> {
        let mut inner = self.write();
        let msg = inner
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(RepositoryError::NotFound)?;

        msg.is_deleted = true;
        Ok(())
    }
}
