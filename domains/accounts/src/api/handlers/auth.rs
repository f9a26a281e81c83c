//! Registration and token API handlers
//!
//! - POST /register - Create a user
//! - POST /token - Exchange username/password (form) for an access token
//! - GET /verify-token - Confirm a bearer token is still valid

use axum::{
    extract::{Form, State},
    Json,
};
use chatwidget_auth::{issue_access_token, AuthUser, TOKEN_TYPE};
use chatwidget_common::{Error, RepositoryError, Result, ValidatedJson};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::AccountsState;
use crate::domain::entities::User;

const DUPLICATE_USERNAME: &str = "Username already registered";
const BAD_CREDENTIALS: &str = "Incorrect username or password";

/// Request for registering a user
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Form body for token issuance
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Response for user operations
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VerifyTokenResponse {
    pub message: &'static str,
    pub username: String,
}

/// POST /register
pub async fn register(
    State(state): State<AccountsState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<Json<UserResponse>> {
    if state
        .repos
        .users
        .find_by_username(&req.username)
        .await?
        .is_some()
    {
        return Err(Error::Validation(DUPLICATE_USERNAME.to_string()));
    }

    let user = User::new(req.username, &req.password)?;

    let created = state.repos.users.create(&user).await.map_err(|e| match e {
        RepositoryError::AlreadyExists => Error::Validation(DUPLICATE_USERNAME.to_string()),
        other => other.into(),
    })?;

    tracing::info!(user_id = %created.id, username = %created.username, "User registered");

    Ok(Json(created.into()))
}

/// POST /token
pub async fn login_for_access_token(
    State(state): State<AccountsState>,
    Form(req): Form<TokenRequest>,
) -> Result<Json<TokenResponse>> {
    let user = state.repos.users.find_by_username(&req.username).await?;

    let user = match user {
        Some(user) if user.verify_password(&req.password) => user,
        _ => {
            tracing::warn!(username = %req.username, "Rejected login attempt");
            return Err(Error::Authentication(BAD_CREDENTIALS.to_string()));
        }
    };

    let access_token = issue_access_token(&user.username, state.auth.config())
        .map_err(|e| Error::Internal(e.to_string()))?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: TOKEN_TYPE,
    }))
}

/// GET /verify-token
pub async fn verify_token(AuthUser(ctx): AuthUser) -> Json<VerifyTokenResponse> {
    Json(VerifyTokenResponse {
        message: "Token is valid",
        username: ctx.username().to_string(),
    })
}
