//! Completion gateway
//!
//! Turns an ordered list of role-tagged turns into a single assistant reply.
//! `LlmServiceFactory` picks the concrete provider from configuration.

mod mock;
mod openai;

pub use mock::MockLlmService;
pub use openai::OpenAiService;

/// Role of a single turn in a completion prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmRole {
    System,
    User,
    Assistant,
}

impl LlmRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmRole::System => "system",
            LlmRole::User => "user",
            LlmRole::Assistant => "assistant",
        }
    }
}

/// One turn of a completion prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmMessage {
    pub role: LlmRole,
    pub content: String,
}

impl LlmMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: LlmRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: LlmRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: LlmRole::Assistant,
            content: content.into(),
        }
    }
}

/// Completion request. An empty `model` means the service default.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<LlmMessage>,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<LlmMessage>) -> Self {
        Self {
            model: String::new(),
            messages,
            max_tokens: None,
        }
    }
}

/// Completion response
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: i32,
    pub output_tokens: i32,
    pub finish_reason: String,
}

/// Completion gateway errors
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Provider returned an error: {0}")]
    Response(String),

    #[error("Rate limited by provider")]
    RateLimit,

    #[error("Completion prompt contains no turns")]
    EmptyPrompt,
}

impl From<LlmError> for chatwidget_common::Error {
    fn from(err: LlmError) -> Self {
        chatwidget_common::Error::Upstream(err.to_string())
    }
}

/// Provider configuration
#[derive(Clone)]
pub struct LlmConfig {
    /// `"openai"` or `"mock"`
    pub provider: String,
    pub api_key: String,
    pub default_model: String,
    pub max_tokens: Option<u32>,
    pub base_url: Option<String>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("default_model", &self.default_model)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl From<&chatwidget_common::Config> for LlmConfig {
    fn from(config: &chatwidget_common::Config) -> Self {
        Self {
            provider: config.llm_provider.clone(),
            api_key: config.openai_api_key.clone().unwrap_or_default(),
            default_model: config.openai_model.clone(),
            max_tokens: config.openai_max_tokens,
            base_url: config.openai_base_url.clone(),
        }
    }
}

/// Completion gateway seam
#[async_trait::async_trait]
pub trait LlmService: Send + Sync {
    /// Produce one assistant reply for the given turns
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    fn default_model(&self) -> &str;
}

/// Builds the configured provider
pub struct LlmServiceFactory;

impl LlmServiceFactory {
    pub fn create(config: LlmConfig) -> Result<Box<dyn LlmService>, LlmError> {
        match config.provider.as_str() {
            "openai" => {
                if config.api_key.is_empty() {
                    return Err(LlmError::Configuration(
                        "OpenAI provider requires an API key".to_string(),
                    ));
                }
                Ok(Box::new(OpenAiService::new(config)))
            }
            "mock" => Ok(Box::new(MockLlmService::new())),
            other => Err(LlmError::Configuration(format!(
                "Unknown LLM provider: {}",
                other
            ))),
        }
    }
}
