//! Authentication for the chat widget API
//!
//! Provides access token issuance and validation, identity lookup, and axum
//! extractors that work with any domain state implementing `FromRef<S>` for
//! `AuthBackend`.

mod backend;
mod claims;
mod config;
mod context;
mod error;
mod extractors;
mod jwt;
mod types;

pub use backend::{AuthBackend, IdentityStore, PgIdentityStore};
pub use claims::AccessClaims;
pub use config::AuthConfig;
pub use context::AuthContext;
pub use error::AuthError;
pub use extractors::AuthUser;
pub use jwt::{issue_access_token, validate_access_token, TOKEN_TYPE};
pub use types::AuthIdentity;
