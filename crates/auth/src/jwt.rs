//! Access token issue/validation and token extraction helpers

use axum::http::HeaderValue;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::AccessClaims;
use crate::config::AuthConfig;
use crate::error::AuthError;

/// Token type reported alongside issued access tokens
pub const TOKEN_TYPE: &str = "bearer";

/// Issue a signed HS256 access token for `subject`
pub fn issue_access_token(subject: &str, config: &AuthConfig) -> Result<String, AuthError> {
    let now = Utc::now();
    let expires_at = TimeDelta::try_minutes(config.access_token_ttl_minutes)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| {
            tracing::error!(
                ttl_minutes = config.access_token_ttl_minutes,
                "Access token lifetime out of range"
            );
            AuthError::TokenIssueFailed
        })?;

    let claims = AccessClaims {
        sub: subject.to_string(),
        iat: now.timestamp() as u64,
        exp: expires_at.timestamp() as u64,
    };

    let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_ref());
    encode(&Header::new(Algorithm::HS256), &claims, &encoding_key).map_err(|e| {
        tracing::error!(error = %e, "Failed to sign access token");
        AuthError::TokenIssueFailed
    })
}

/// Validate an access token's signature and expiry
pub fn validate_access_token(token: &str, config: &AuthConfig) -> Result<AccessClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_ref());

    let token_data = decode::<AccessClaims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        AuthError::InvalidToken
    })?;

    if token_data.claims.sub.is_empty() {
        return Err(AuthError::InvalidToken);
    }

    Ok(token_data.claims)
}

/// Extract bearer token from Authorization header
pub(crate) fn extract_bearer_token(header: &HeaderValue) -> Result<String, AuthError> {
    let header_str = header
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorizationFormat)?;

    match header_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(AuthError::InvalidAuthorizationFormat),
    }
}
