//! Mock LLM Service Implementation
//!
//! Used by `LlmServiceFactory` when provider is `"mock"`, and by tests.
//! Replies deterministically with `"Mock response to: <last turn>"` unless a
//! scripted outcome has been queued. Every request is recorded.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{CompletionRequest, CompletionResponse, LlmError, LlmService};

const MOCK_MODEL: &str = "mock-model";

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Failure(String),
}

/// Mock LLM service for testing
#[derive(Debug, Clone, Default)]
pub struct MockLlmService {
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    script: Arc<Mutex<VecDeque<Scripted>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockLlmService {
    /// Create a new mock LLM service
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next unscripted call
    pub fn push_response(&self, content: impl Into<String>) {
        lock(&self.script).push_back(Scripted::Reply(content.into()));
    }

    /// Queue a provider failure for the next call
    pub fn push_failure(&self, message: impl Into<String>) {
        lock(&self.script).push_back(Scripted::Failure(message.into()));
    }

    /// All requests received so far, oldest first
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        lock(&self.requests).clone()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        lock(&self.requests).last().cloned()
    }

    pub fn reset(&self) {
        lock(&self.requests).clear();
        lock(&self.script).clear();
    }
}

#[async_trait::async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        tracing::info!(turns = request.messages.len(), "Mock LLM service processing completion request");

        lock(&self.requests).push(request.clone());

        if request.messages.is_empty() {
            return Err(LlmError::EmptyPrompt);
        }

        let model = if request.model.is_empty() {
            MOCK_MODEL.to_string()
        } else {
            request.model.clone()
        };

        let content = match lock(&self.script).pop_front() {
            Some(Scripted::Reply(content)) => content,
            Some(Scripted::Failure(message)) => return Err(LlmError::Response(message)),
            None => {
                let last_message = request
                    .messages
                    .last()
                    .map(|m| m.content.as_str())
                    .unwrap_or("empty");
                format!("Mock response to: {}", last_message)
            }
        };

        let input_tokens = request
            .messages
            .iter()
            .map(|m| m.content.len() as i32 / 4)
            .sum::<i32>();
        let output_tokens = content.len() as i32 / 4;

        Ok(CompletionResponse {
            content,
            model,
            input_tokens,
            output_tokens,
            finish_reason: "stop".to_string(),
        })
    }

    fn default_model(&self) -> &str {
        MOCK_MODEL
    }
}
