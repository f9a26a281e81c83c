//! Conversations domain state and auth backend integration

use crate::{ConversationController, ConversationsRepositories};
use axum::extract::FromRef;
use chatwidget_auth::AuthBackend;
use chatwidget_llm::LlmService;
use std::sync::Arc;

/// Application state for the Conversations domain
#[derive(Clone)]
pub struct ConversationsState {
    pub repos: ConversationsRepositories,
    pub auth: AuthBackend,
    pub llm: Arc<dyn LlmService>,
}

impl ConversationsState {
    pub fn controller(&self) -> ConversationController {
        ConversationController::new(self.repos.clone(), Arc::clone(&self.llm))
    }
}

impl FromRef<ConversationsState> for AuthBackend {
    fn from_ref(state: &ConversationsState) -> Self {
        state.auth.clone()
    }
}
