//! In-memory credential store for tests
//!
//! Also serves as the `IdentityStore` behind `AuthBackend`, so a single
//! instance backs both registration and bearer authentication.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chatwidget_auth::{AuthError, AuthIdentity, IdentityStore};
use chatwidget_common::RepositoryError;

use crate::domain::entities::User;
use crate::repository::UserRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Vec<User> {
        self.users
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .snapshot()
            .into_iter()
            .find(|u| u.username == username))
    }

    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        let mut users = self
            .users
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if users.iter().any(|u| u.username == user.username) {
            return Err(RepositoryError::AlreadyExists);
        }

        users.push(user.clone());
        Ok(user.clone())
    }
}

#[async_trait]
impl IdentityStore for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<AuthIdentity>, AuthError> {
        Ok(self
            .snapshot()
            .into_iter()
            .find(|u| u.username == username)
            .map(|u| AuthIdentity {
                id: u.id,
                username: u.username,
                created_at: u.created_at,
            }))
    }
}
