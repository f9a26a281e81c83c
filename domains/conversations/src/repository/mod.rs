//! Repository implementations for the Conversations domain

pub mod conversations;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod messages;

use std::sync::Arc;

use sqlx::PgPool;

pub use conversations::{ConversationRepository, PgConversationRepository};
#[cfg(any(test, feature = "test-support"))]
pub use memory::InMemoryConversationStore;
pub use messages::{MessageRepository, PgMessageRepository};

/// Combined repository access for the Conversations domain
#[derive(Clone)]
pub struct ConversationsRepositories {
    pub conversations: Arc<dyn ConversationRepository>,
    pub messages: Arc<dyn MessageRepository>,
}

impl ConversationsRepositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            conversations: Arc::new(PgConversationRepository::new(pool.clone())),
            messages: Arc::new(PgMessageRepository::new(pool)),
        }
    }

    /// Both repositories backed by one shared in-memory store
    #[cfg(any(test, feature = "test-support"))]
    pub fn in_memory(store: InMemoryConversationStore) -> Self {
        Self {
            conversations: Arc::new(store.clone()),
            messages: Arc::new(store),
        }
    }
}
