use serde::{Deserialize, Serialize};

use crate::MetapromptError;

/// One submission from the user: the task description or existing prompt
/// to be turned into a system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub task_or_prompt: String,
}

impl GenerationRequest {
    /// Build a request, rejecting empty input.
    ///
    /// Whitespace-only input is accepted; only the empty string is refused.
    pub fn new(task_or_prompt: impl Into<String>) -> Result<Self, MetapromptError> {
        let task_or_prompt = task_or_prompt.into();
        if task_or_prompt.is_empty() {
            return Err(MetapromptError::EmptyInput);
        }
        Ok(Self { task_or_prompt })
    }

    pub fn task(&self) -> &str {
        &self.task_or_prompt
    }
}
