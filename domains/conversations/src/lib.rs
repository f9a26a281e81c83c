//! Conversations domain: per-user conversation, message ledger, edit/regenerate controller

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::controller::{
    build_turns, ConversationController, EditOutcome, CONVERSATION_PREAMBLE, GREETING_PREAMBLE,
};
pub use domain::entities::{Conversation, Message, MessageRole, NewMessage};

// Re-export repository types
#[cfg(any(test, feature = "test-support"))]
pub use repository::InMemoryConversationStore;
pub use repository::{
    ConversationRepository, ConversationsRepositories, MessageRepository,
    PgConversationRepository, PgMessageRepository,
};

// Re-export API types
pub use api::routes;
pub use api::ConversationsState;
