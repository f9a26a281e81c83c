//! Route definitions for Accounts domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::auth;
use super::middleware::AccountsState;

/// Create all Accounts domain API routes
pub fn routes() -> Router<AccountsState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/token", post(auth::login_for_access_token))
        .route("/verify-token", get(auth::verify_token))
}
