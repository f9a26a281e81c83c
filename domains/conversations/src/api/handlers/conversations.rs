//! Conversation lifecycle API handlers

use axum::{extract::State, Json};
use chatwidget_auth::AuthUser;
use chatwidget_common::Result;

use super::messages::MessageResponse;
use crate::api::middleware::ConversationsState;

/// GET /initial-message
pub async fn initial_message(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
) -> Result<Json<MessageResponse>> {
    let greeting = state.controller().initial_greeting(ctx.user_id()).await?;
    Ok(Json(greeting.into()))
}

/// POST /reset-conversation
pub async fn reset_conversation(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
) -> Result<Json<MessageResponse>> {
    let greeting = state.controller().reset(ctx.user_id()).await?;
    Ok(Json(greeting.into()))
}
