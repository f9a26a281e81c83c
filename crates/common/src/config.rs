//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables once at process
//! start and passed by value into the composition root.

use anyhow::Result;
use std::env;

/// Default completion model
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Default access token lifetime in minutes
pub const DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 30;

/// Longest accepted access token lifetime (one year)
pub const MAX_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 60 * 24 * 365;

#[derive(Clone)]
pub struct Config {
    /// Database connection URL (PostgreSQL)
    pub database_url: String,

    /// Secret used to sign access tokens
    pub secret_key: String,
    /// Access token lifetime in minutes
    pub access_token_expire_minutes: i64,

    /// Completion gateway
    pub llm_provider: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub openai_max_tokens: Option<u32>,

    /// Comma-separated list of allowed CORS origins
    pub cors_allowed_origins: String,
    /// Optional route prefix such as `/api/v1`
    pub api_prefix: String,

    /// Runtime configuration
    pub rust_log: String,
    pub port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .field(
                "access_token_expire_minutes",
                &self.access_token_expire_minutes,
            )
            .field("llm_provider", &self.llm_provider)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("openai_model", &self.openai_model)
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_max_tokens", &self.openai_max_tokens)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("api_prefix", &self.api_prefix)
            .field("rust_log", &self.rust_log)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let llm_provider = env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string());
        let openai_api_key = env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());

        if llm_provider == "openai" && openai_api_key.is_none() {
            return Err(anyhow::anyhow!(
                "OPENAI_API_KEY is required when LLM_PROVIDER is openai"
            ));
        }

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL is required"))?,

            secret_key: env::var("SECRET_KEY")
                .map_err(|_| anyhow::anyhow!("SECRET_KEY is required"))?,
            access_token_expire_minutes: access_token_expire_minutes()?,

            llm_provider,
            openai_api_key,
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url: env::var("OPENAI_BASE_URL").ok().filter(|u| !u.is_empty()),
            openai_max_tokens: env::var("OPENAI_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok()),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            api_prefix: normalize_prefix(&env::var("API_PREFIX").unwrap_or_default()),

            rust_log: env::var("RUST_LOG")
                .unwrap_or_else(|_| "chatwidget=debug,tower_http=info".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
        };

        Ok(config)
    }
}

/// Parse `ACCESS_TOKEN_EXPIRE_MINUTES`, rejecting values outside `1..=MAX`
fn access_token_expire_minutes() -> Result<i64> {
    let Ok(raw) = env::var("ACCESS_TOKEN_EXPIRE_MINUTES") else {
        return Ok(DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES);
    };

    match raw.trim().parse::<i64>() {
        Ok(minutes) if (1..=MAX_ACCESS_TOKEN_EXPIRE_MINUTES).contains(&minutes) => Ok(minutes),
        _ => Err(anyhow::anyhow!(
            "ACCESS_TOKEN_EXPIRE_MINUTES must be an integer between 1 and {}",
            MAX_ACCESS_TOKEN_EXPIRE_MINUTES
        )),
    }
}

/// Normalize a route prefix to `/segment` form, or empty for none
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
