//! Repository implementations for the Accounts domain

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod users;

use std::sync::Arc;

use sqlx::PgPool;

#[cfg(any(test, feature = "test-support"))]
pub use memory::InMemoryUserRepository;
pub use users::{PgUserRepository, UserRepository};

/// Combined repository access for the Accounts domain
#[derive(Clone)]
pub struct AccountsRepositories {
    pub users: Arc<dyn UserRepository>,
}

impl AccountsRepositories {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::new(Arc::new(PgUserRepository::new(pool)))
    }
}
