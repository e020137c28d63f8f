use async_trait::async_trait;
use metaprompt_core::ChatMessage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("missing API key (set OPENAI_API_KEY)")]
    MissingCredential,

    #[error("request failed: {0}")]
    Request(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("response contained no completion text")]
    EmptyResponse,
}

/// A hosted chat-completion endpoint.
///
/// `OpenAiService` talks to an OpenAI-compatible API over HTTP.
/// `MockCompletion` returns canned replies for tests.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Human-readable backend name for logging.
    fn name(&self) -> &str;

    /// Send one exchange and return the text of the first choice.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ServiceError>;
}
