use async_trait::async_trait;
use metaprompt_core::ChatMessage;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CompletionService, ServiceError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

// No sampling parameters: provider defaults apply.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Async client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiService {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: Client,
}

impl OpenAiService {
    /// A client for the public OpenAI API. A missing or blank key is only
    /// reported when a completion is requested.
    pub fn new(api_key: Option<String>) -> Self {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            client: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl CompletionService for OpenAiService {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ServiceError> {
        let key = self.api_key.as_deref().ok_or(ServiceError::MissingCredential)?;

        let url = format!("{}/chat/completions", self.base_url);
        debug!(%url, model = %self.model, turns = messages.len(), "sending chat completion");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&ChatRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ServiceError::Request(format!("read body: {e}")))?;

        if !status.is_success() {
            return Err(parse_error(status, body));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| ServiceError::Decode(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ServiceError::EmptyResponse)
    }
}

/// Pull `error.message` out of an OpenAI-style error body, falling back to
/// the raw body.
fn parse_error(status: StatusCode, body: String) -> ServiceError {
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or(body);
    ServiceError::Api {
        status: status.as_u16(),
        message,
    }
}
