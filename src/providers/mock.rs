/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::echo()` - Replies with the batch JSON wrapped in prose
 * - `MockProvider::scripted(..)` - Plays back a fixed list of replies and failures
 * - `MockProvider::failing()` - Always fails with an error
 *
 * Every conversation the mock receives is recorded so tests can inspect how
 * the translator extended it between attempts.
 */

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::translation::conversation::{Conversation, Role};

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// The assistant's message text
    pub text: String,
}

/// Type of error to simulate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockErrorType {
    /// Authentication error (invalid API key)
    Auth,
    /// Connection error
    Connection,
    /// Rate limit error
    RateLimit,
    /// API error with a 500 status
    Api,
}

impl MockErrorType {
    fn to_error(self) -> ProviderError {
        match self {
            MockErrorType::Auth => ProviderError::AuthenticationError("Invalid API key".into()),
            MockErrorType::Connection => ProviderError::ConnectionError("Connection failed".into()),
            MockErrorType::RateLimit => ProviderError::RateLimitExceeded("Rate limit exceeded".into()),
            MockErrorType::Api => ProviderError::ApiError {
                status_code: 500,
                message: "Internal server error".into(),
            },
        }
    }
}

/// One scripted step
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Reply with this assistant text
    Text(String),
    /// Fail the request
    Fail(MockErrorType),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Echo the batch JSON back, as if every value translated to itself
    Echo,
    /// Play back the scripted replies in order
    Scripted,
    /// Always fail with an error
    Failing,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Remaining scripted replies
    script: Arc<Mutex<VecDeque<MockReply>>>,
    /// Conversations received, in call order
    requests: Arc<Mutex<Vec<Conversation>>>,
    /// Request counter
    request_count: Arc<AtomicUsize>,
    /// Value rewrite applied by the echo behavior
    transform: Option<fn(&str) -> String>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            request_count: Arc::new(AtomicUsize::new(0)),
            transform: None,
        }
    }

    /// Create a mock that echoes every batch back
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a mock that plays back the given replies; further calls fail
    pub fn scripted(replies: impl IntoIterator<Item = MockReply>) -> Self {
        let mock = Self::new(MockBehavior::Scripted);
        lock(&mock.script).extend(replies);
        mock
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Rewrite every echoed value with the given function
    pub fn with_transform(mut self, transform: fn(&str) -> String) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Conversations received so far
    pub fn requests(&self) -> Vec<Conversation> {
        lock(&self.requests).clone()
    }

    /// Build an echo reply for a conversation
    fn echo_reply(&self, conversation: &Conversation) -> Result<String, ProviderError> {
        let batch_json = conversation.turns().iter()
            .find(|turn| turn.role == Role::User)
            .map(|turn| turn.content.as_str())
            .ok_or_else(|| ProviderError::RequestFailed("conversation has no user turn".into()))?;

        let mut batch: serde_json::Map<String, serde_json::Value> = serde_json::from_str(batch_json)
            .map_err(|e| ProviderError::RequestFailed(format!("user turn is not JSON: {}", e)))?;

        if let Some(transform) = self.transform {
            for value in batch.values_mut() {
                if let Some(text) = value.as_str() {
                    *value = serde_json::Value::String(transform(text));
                }
            }
        }

        let body = serde_json::to_string_pretty(&batch)
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        Ok(format!("Here is the translation:\n{}\nLet me know if you need anything else.", body))
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Response = MockResponse;

    async fn complete(&self, conversation: &Conversation) -> Result<Self::Response, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        lock(&self.requests).push(conversation.clone());

        let text = match self.behavior {
            MockBehavior::Echo => self.echo_reply(conversation)?,
            MockBehavior::Failing => return Err(MockErrorType::Api.to_error()),
            MockBehavior::Scripted => match lock(&self.script).pop_front() {
                Some(MockReply::Text(text)) => text,
                Some(MockReply::Fail(error_type)) => return Err(error_type.to_error()),
                None => return Err(ProviderError::RequestFailed("mock script exhausted".into())),
            },
        };

        Ok(MockResponse { text })
    }

    fn extract_text(response: &Self::Response) -> Result<String, ProviderError> {
        Ok(response.text.clone())
    }
}
