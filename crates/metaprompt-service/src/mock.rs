use std::sync::Mutex;

use async_trait::async_trait;
use metaprompt_core::ChatMessage;

use crate::{CompletionService, ServiceError};

enum Reply {
    Text(String),
    Fail(String),
}

/// A completion service for tests: returns a preconfigured reply and records
/// every exchange it was sent.
pub struct MockCompletion {
    reply: Reply,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockCompletion {
    /// Create a mock that answers every request with `text`.
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Reply::Text(text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock whose every request fails with a request error
    /// carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            reply: Reply::Fail(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Exchanges received so far, oldest first.
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CompletionService for MockCompletion {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ServiceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail(message) => Err(ServiceError::Request(message.clone())),
        }
    }
}
