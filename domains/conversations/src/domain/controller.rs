//! Conversation controller
//!
//! Keeps one conversation per user and keeps each user turn consistent with
//! the single assistant reply that follows it.
//!
//! The paired reply of a user message is the first assistant message with a
//! larger id in the same conversation. Editing a user message regenerates
//! that reply in place; nothing else is touched and no message is created.
//!
//! Read-modify-write sequences here are not locked. Two concurrent first
//! requests from one user can create two conversations; the earliest one
//! wins on every later lookup.

use std::sync::Arc;

use chatwidget_common::{Error, Result};
use chatwidget_llm::{CompletionRequest, LlmMessage, LlmService};
use uuid::Uuid;

use crate::domain::entities::{
    validate_user_content, Conversation, Message, MessageRole, NewMessage,
};
use crate::repository::ConversationsRepositories;

/// System turn prepended to every chat prompt
pub const CONVERSATION_PREAMBLE: &str = "You are a helpful assistant named Ava.";

/// Sole turn of a greeting prompt
pub const GREETING_PREAMBLE: &str =
    "You are a helpful assistant named Ava. Greet the user and ask how you can help them today.";

/// Result of editing a user message
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub user_message: Message,
    pub paired_reply: Option<Message>,
}

impl EditOutcome {
    /// The edited message followed by its reply, if any
    pub fn into_messages(self) -> Vec<Message> {
        std::iter::once(self.user_message)
            .chain(self.paired_reply)
            .collect()
    }
}

#[derive(Clone)]
pub struct ConversationController {
    repos: ConversationsRepositories,
    llm: Arc<dyn LlmService>,
}

impl ConversationController {
    pub fn new(repos: ConversationsRepositories, llm: Arc<dyn LlmService>) -> Self {
        Self { repos, llm }
    }

    /// Append a user turn and the assistant's answer to it
    pub async fn send(&self, user_id: Uuid, content: String) -> Result<Message> {
        validate_user_content(&content)?;

        let conversation = self.ensure_conversation(user_id).await?;

        let user_message = self
            .repos
            .messages
            .append(&NewMessage::user(conversation.id, content)?)
            .await?;

        let history = self.repos.messages.list_active(conversation.id).await?;
        let reply = self
            .complete(
                build_turns(CONVERSATION_PREAMBLE, &history),
                user_id,
                conversation.id,
            )
            .await?;

        let assistant = self
            .repos
            .messages
            .append(&NewMessage::assistant(conversation.id, reply))
            .await?;

        tracing::debug!(
            user_id = %user_id,
            conversation_id = %conversation.id,
            user_message_id = user_message.id,
            message_id = assistant.id,
            "Appended chat turn"
        );

        Ok(assistant)
    }

    /// Non-deleted messages of the user's conversation, oldest first
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Message>> {
        match self.repos.conversations.find_for_user(user_id).await? {
            Some(conversation) => Ok(self.repos.messages.list_active(conversation.id).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Ask the gateway for a greeting and append it
    pub async fn initial_greeting(&self, user_id: Uuid) -> Result<Message> {
        let conversation = self.ensure_conversation(user_id).await?;
        self.greet(user_id, &conversation).await
    }

    /// Overwrite a user message, then regenerate its paired reply.
    ///
    /// The edit is persisted before the gateway call, so a gateway failure
    /// leaves the new user content in place and the reply unchanged.
    pub async fn edit(&self, user_id: Uuid, message_id: i64, content: String) -> Result<EditOutcome> {
        validate_user_content(&content)?;

        let original = self
            .owned_user_message(user_id, message_id, "Can only edit user messages")
            .await?;

        let user_message = self
            .repos
            .messages
            .update_content(original.id, &content)
            .await?;

        let Some(reply) = self
            .repos
            .messages
            .find_paired_reply(user_message.conversation_id, user_message.id)
            .await?
        else {
            return Ok(EditOutcome {
                user_message,
                paired_reply: None,
            });
        };

        // Context runs through the reply by id and keeps soft-deleted turns
        let context = self
            .repos
            .messages
            .list_through(user_message.conversation_id, reply.id)
            .await?;

        let regenerated = self
            .complete(
                build_turns(CONVERSATION_PREAMBLE, &context),
                user_id,
                user_message.conversation_id,
            )
            .await?;

        let paired_reply = self
            .repos
            .messages
            .update_content(reply.id, &regenerated)
            .await?;

        tracing::debug!(
            user_id = %user_id,
            message_id = user_message.id,
            reply_id = paired_reply.id,
            "Regenerated paired reply"
        );

        Ok(EditOutcome {
            user_message,
            paired_reply: Some(paired_reply),
        })
    }

    /// Soft-delete a user message. Its paired reply stays visible.
    pub async fn delete(&self, user_id: Uuid, message_id: i64) -> Result<()> {
        let message = self
            .owned_user_message(user_id, message_id, "Can only delete user messages")
            .await?;

        self.repos.messages.soft_delete(message.id).await?;

        tracing::info!(user_id = %user_id, message_id = message.id, "Message soft-deleted");
        Ok(())
    }

    /// Drop every conversation of the user and start over with a greeting
    pub async fn reset(&self, user_id: Uuid) -> Result<Message> {
        let removed = self.repos.conversations.delete_for_user(user_id).await?;

        let conversation = self
            .repos
            .conversations
            .create(&Conversation::new(user_id))
            .await?;

        tracing::info!(
            user_id = %user_id,
            removed_conversations = removed,
            conversation_id = %conversation.id,
            "Conversation reset"
        );

        self.greet(user_id, &conversation).await
    }

    async fn ensure_conversation(&self, user_id: Uuid) -> Result<Conversation> {
        if let Some(conversation) = self.repos.conversations.find_for_user(user_id).await? {
            return Ok(conversation);
        }

        let conversation = self
            .repos
            .conversations
            .create(&Conversation::new(user_id))
            .await?;

        tracing::info!(user_id = %user_id, conversation_id = %conversation.id, "Conversation created");
        Ok(conversation)
    }

    async fn greet(&self, user_id: Uuid, conversation: &Conversation) -> Result<Message> {
        let greeting = self
            .complete(
                vec![LlmMessage::system(GREETING_PREAMBLE)],
                user_id,
                conversation.id,
            )
            .await?;

        Ok(self
            .repos
            .messages
            .append(&NewMessage::assistant(conversation.id, greeting))
            .await?)
    }

    /// Message `message_id` if it sits in the user's conversation and is user-authored
    async fn owned_user_message(
        &self,
        user_id: Uuid,
        message_id: i64,
        not_user_authored: &str,
    ) -> Result<Message> {
        let not_found = || Error::NotFound("Message not found".to_string());

        let message = self
            .repos
            .messages
            .find(message_id)
            .await?
            .ok_or_else(not_found)?;

        let conversation = self
            .repos
            .conversations
            .find(message.conversation_id)
            .await?
            .ok_or_else(not_found)?;

        if conversation.user_id != user_id {
            return Err(not_found());
        }

        if !message.is_user_message {
            return Err(Error::InvalidOperation(not_user_authored.to_string()));
        }

        Ok(message)
    }

    async fn complete(
        &self,
        turns: Vec<LlmMessage>,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<String> {
        let response = self
            .llm
            .complete(CompletionRequest::new(turns))
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    user_id = %user_id,
                    conversation_id = %conversation_id,
                    "Completion gateway call failed"
                );
                e
            })?;

        Ok(response.content)
    }
}

/// System preamble followed by one turn per message, in the given order
pub fn build_turns(preamble: &str, history: &[Message]) -> Vec<LlmMessage> {
    std::iter::once(LlmMessage::system(preamble))
        .chain(history.iter().map(|m| match m.role() {
            MessageRole::User => LlmMessage::user(m.content.clone()),
            MessageRole::Assistant => LlmMessage::assistant(m.content.clone()),
        }))
        .collect()
}
