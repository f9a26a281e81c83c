//! Chat widget application composition root
//!
//! Composes the domain routers into a single application and applies the
//! shared HTTP layers.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use chatwidget_accounts::{AccountsRepositories, AccountsState};
use chatwidget_auth::{AuthBackend, AuthConfig};
use chatwidget_common::Config;
use chatwidget_conversations::{ConversationsRepositories, ConversationsState};
use chatwidget_llm::{LlmConfig, LlmService, LlmServiceFactory};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Maximum accepted request body
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Everything the domain routers need, already constructed
#[derive(Clone)]
pub struct AppServices {
    pub accounts: AccountsRepositories,
    pub conversations: ConversationsRepositories,
    pub auth: AuthBackend,
    pub llm: Arc<dyn LlmService>,
}

/// Derive token settings from process configuration
pub fn auth_config(config: &Config) -> AuthConfig {
    AuthConfig {
        jwt_secret: config.secret_key.clone(),
        access_token_ttl_minutes: config.access_token_expire_minutes,
    }
}

/// Merge domain routers, mounting them under `api_prefix` when non-empty.
/// `/health` always stays at the root.
pub fn build_router(services: AppServices, api_prefix: &str) -> Router {
    let accounts_state = AccountsState {
        repos: services.accounts,
        auth: services.auth.clone(),
    };

    let conversations_state = ConversationsState {
        repos: services.conversations,
        auth: services.auth,
        llm: services.llm,
    };

    let api = Router::new()
        .merge(chatwidget_accounts::routes().with_state(accounts_state))
        .merge(chatwidget_conversations::routes().with_state(conversations_state));

    let router = Router::new().route("/health", axum::routing::get(health_check));

    if api_prefix.is_empty() {
        router.merge(api)
    } else {
        router.nest(api_prefix, api)
    }
}

/// Build the production application: Postgres stores, configured gateway, HTTP layers
pub fn create_app(config: &Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    let llm = LlmServiceFactory::create(LlmConfig::from(config))?;
    tracing::info!(
        provider = %config.llm_provider,
        model = %llm.default_model(),
        "Completion gateway configured"
    );

    let services = AppServices {
        accounts: AccountsRepositories::postgres(pool.clone()),
        conversations: ConversationsRepositories::postgres(pool.clone()),
        auth: AuthBackend::postgres(pool, auth_config(config)),
        llm: Arc::from(llm),
    };

    let app = build_router(services, &config.api_prefix);
    Ok(apply_http_layers(app, &config.cors_allowed_origins))
}

/// Body limit, CORS and request tracing, innermost first
pub fn apply_http_layers(app: Router, cors_allowed_origins: &str) -> Router {
    app.layer(body_limit_layer())
        .layer(build_cors_layer(cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// CORS for an explicit, comma-separated origin list with credentials allowed
pub fn build_cors_layer(origins: &str) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

pub fn body_limit_layer() -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(MAX_BODY_BYTES)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
