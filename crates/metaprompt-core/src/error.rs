use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetapromptError {
    #[error("Please enter a task or prompt.")]
    EmptyInput,

    /// Any failure while talking to the completion service. Carries the
    /// underlying cause's description.
    #[error("Error generating prompt: {0}")]
    GenerationFailed(String),
}
