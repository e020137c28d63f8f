use std::sync::Arc;

use metaprompt_core::{GenerationRequest, MetapromptError};
use tracing::{info, warn};

use crate::CompletionService;

/// Turns a task description into a generated system prompt with one call to
/// the completion service.
#[derive(Clone)]
pub struct Generator {
    service: Arc<dyn CompletionService>,
}

impl Generator {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self { service }
    }

    /// Send the meta prompt plus the user's text and return the first
    /// choice's text unchanged.
    ///
    /// Every service failure becomes a single `GenerationFailed` carrying the
    /// cause's description. No retries.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, MetapromptError> {
        let messages = metaprompt_prompts::build_exchange(request);

        match self.service.complete(&messages).await {
            Ok(text) => {
                info!(
                    backend = self.service.name(),
                    input_len = request.task().len(),
                    output_len = text.len(),
                    "prompt generated"
                );
                Ok(text)
            }
            Err(e) => {
                warn!(backend = self.service.name(), "generation failed: {e}");
                Err(MetapromptError::GenerationFailed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockCompletion;
    use metaprompt_core::ChatMessage;
    use metaprompt_prompts::{build_exchange, META_PROMPT};

    fn exchange_for(task: &str) -> Vec<ChatMessage> {
        build_exchange(&GenerationRequest::new(task).unwrap())
    }

    #[tokio::test]
    async fn haiku_scenario_returns_stub_text() {
        let mock = Arc::new(MockCompletion::replying("T"));
        let generator = Generator::new(mock.clone());

        let req = GenerationRequest::new("Write a haiku generator.").unwrap();
        let out = generator.generate(&req).await.unwrap();
        assert_eq!(out, "T");

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0].content, META_PROMPT);
        assert_eq!(
            calls[0][1].content,
            "Task, Goal, or Current Prompt:\nWrite a haiku generator."
        );
        assert_eq!(calls[0], exchange_for("Write a haiku generator."));
    }

    #[tokio::test]
    async fn output_is_not_transformed() {
        let raw = "  # Heading\n\nbody with trailing space \n";
        let generator = Generator::new(Arc::new(MockCompletion::replying(raw)));
        let req = GenerationRequest::new("x").unwrap();
        assert_eq!(generator.generate(&req).await.unwrap(), raw);
    }

    #[tokio::test]
    async fn failure_is_wrapped_exactly_once() {
        let generator = Generator::new(Arc::new(MockCompletion::failing("connection reset")));
        let req = GenerationRequest::new("x").unwrap();
        let err = generator.generate(&req).await.unwrap_err();

        let cause = crate::ServiceError::Request("connection reset".into()).to_string();
        assert_eq!(err, MetapromptError::GenerationFailed(cause.clone()));
        assert_eq!(err.to_string(), format!("Error generating prompt: {cause}"));
        assert_eq!(err.to_string().matches("Error generating prompt: ").count(), 1);
    }

    #[tokio::test]
    async fn each_call_is_independent() {
        let mock = Arc::new(MockCompletion::replying("ok"));
        let generator = Generator::new(mock.clone());
        for task in ["first", "second"] {
            let req = GenerationRequest::new(task).unwrap();
            generator.generate(&req).await.unwrap();
        }
        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], exchange_for("second"));
    }
}
