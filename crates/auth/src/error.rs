//! Authentication errors

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Authentication error
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization header required")]
    MissingAuthorization,

    #[error("Invalid authorization header format")]
    InvalidAuthorizationFormat,

    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Could not validate credentials")]
    UserNotFound,

    #[error("Failed to load user")]
    UserLoadError,

    #[error("Failed to issue access token")]
    TokenIssueFailed,
}

impl AuthError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            AuthError::MissingAuthorization => {
                (StatusCode::UNAUTHORIZED, "MISSING_AUTHORIZATION")
            }
            AuthError::InvalidAuthorizationFormat => {
                (StatusCode::UNAUTHORIZED, "INVALID_AUTHORIZATION")
            }
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            AuthError::UserNotFound => (StatusCode::UNAUTHORIZED, "USER_NOT_FOUND"),
            AuthError::UserLoadError => (StatusCode::INTERNAL_SERVER_ERROR, "USER_LOAD_ERROR"),
            AuthError::TokenIssueFailed => {
                (StatusCode::INTERNAL_SERVER_ERROR, "TOKEN_ISSUE_FAILED")
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
