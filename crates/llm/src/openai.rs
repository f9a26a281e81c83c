//! OpenAI Chat Completions implementation
//!
//! Calls `{base_url}/v1/chat/completions` using the reqwest HTTP client.
//! Any OpenAI-compatible endpoint works by overriding the base URL.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{CompletionRequest, CompletionResponse, LlmConfig, LlmError, LlmService};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessageBody<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessageBody<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: i32,
    completion_tokens: i32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: String,
}

/// OpenAI-style completion service
pub struct OpenAiService {
    client: Client,
    config: LlmConfig,
    base_url: String,
}

impl OpenAiService {
    pub fn new(config: LlmConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            client: Client::new(),
            config,
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl LlmService for OpenAiService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if request.messages.is_empty() {
            return Err(LlmError::EmptyPrompt);
        }

        let model = if request.model.is_empty() {
            self.config.default_model.as_str()
        } else {
            request.model.as_str()
        };

        let body = ChatCompletionRequest {
            model,
            messages: request
                .messages
                .iter()
                .map(|m| ChatMessageBody {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: request.max_tokens.or(self.config.max_tokens),
        };

        let url = format!("{}/v1/chat/completions", self.base_url);

        tracing::debug!(model = %model, turns = body.messages.len(), "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimit);
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_body) {
                return Err(LlmError::Response(format!(
                    "OpenAI API error ({}): {}",
                    error_response
                        .error
                        .error_type
                        .as_deref()
                        .unwrap_or("unknown"),
                    error_response.error.message
                )));
            }

            return Err(LlmError::Response(format!(
                "OpenAI API returned {}: {}",
                status, error_body
            )));
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Response(format!("Failed to parse response: {}", e)))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Response("Response contained no choices".to_string()))?;

        let (input_tokens, output_tokens) = api_response
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            model: api_response.model,
            input_tokens,
            output_tokens,
            finish_reason: choice
                .finish_reason
                .unwrap_or_else(|| "stop".to_string()),
        })
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}
