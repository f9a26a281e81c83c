//! Message API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use chatwidget_auth::AuthUser;
use chatwidget_common::{Result, ValidatedJson};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::middleware::ConversationsState;
use crate::domain::entities::Message;

/// Request for sending a message
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1))]
    pub content: String,
}

/// Request for editing a message
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMessageRequest {
    #[validate(length(min = 1))]
    pub content: String,
}

/// Message response DTO
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub content: String,
    pub is_user_message: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            content: m.content,
            is_user_message: m.is_user_message,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteMessageResponse {
    pub detail: &'static str,
}

/// POST /chat
pub async fn chat(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
    ValidatedJson(req): ValidatedJson<ChatRequest>,
) -> Result<Json<MessageResponse>> {
    let reply = state.controller().send(ctx.user_id(), req.content).await?;
    Ok(Json(reply.into()))
}

/// GET /messages
pub async fn list_messages(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
) -> Result<Json<Vec<MessageResponse>>> {
    let messages = state.controller().list(ctx.user_id()).await?;

    let responses: Vec<MessageResponse> = messages.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

/// PUT /messages/{id}
///
/// Returns the edited message, followed by its regenerated reply when one exists.
pub async fn update_message(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateMessageRequest>,
) -> Result<Json<Vec<MessageResponse>>> {
    let outcome = state.controller().edit(ctx.user_id(), id, req.content).await?;

    let responses: Vec<MessageResponse> =
        outcome.into_messages().into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

/// DELETE /messages/{id}
pub async fn delete_message(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteMessageResponse>> {
    state.controller().delete(ctx.user_id(), id).await?;
    Ok(Json(DeleteMessageResponse {
        detail: "Message deleted",
    }))
}
