//! Accounts domain: credential store, registration, token issuance

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{User, MAX_USERNAME_LEN};

// Re-export repository types
#[cfg(any(test, feature = "test-support"))]
pub use repository::InMemoryUserRepository;
pub use repository::{AccountsRepositories, PgUserRepository, UserRepository};

// Re-export API types
pub use api::routes;
pub use api::AccountsState;
