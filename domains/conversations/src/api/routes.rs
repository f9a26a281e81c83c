//! Route definitions for Conversations domain API

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{conversations, messages};
use super::middleware::ConversationsState;

/// Create conversation lifecycle routes
fn conversation_routes() -> Router<ConversationsState> {
    Router::new()
        .route("/initial-message", get(conversations::initial_message))
        .route("/reset-conversation", post(conversations::reset_conversation))
}

/// Create message routes
fn message_routes() -> Router<ConversationsState> {
    Router::new()
        .route("/chat", post(messages::chat))
        .route("/messages", get(messages::list_messages))
        .route(
            "/messages/{id}",
            put(messages::update_message).delete(messages::delete_message),
        )
}

/// Create all Conversations domain API routes
pub fn routes() -> Router<ConversationsState> {
    Router::new()
        .merge(conversation_routes())
        .merge(message_routes())
}
