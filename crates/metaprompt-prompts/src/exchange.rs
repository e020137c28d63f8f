use metaprompt_core::{ChatMessage, GenerationRequest};

use crate::META_PROMPT;

/// Literal that introduces the user's text in the user turn.
pub const USER_PREFIX: &str = "Task, Goal, or Current Prompt:";

/// Format the user turn for a task description.
pub fn user_message(task: &str) -> String {
    format!("{USER_PREFIX}\n{task}")
}

/// Assemble the two-turn exchange for a generation request: the meta prompt
/// as the system directive, then the prefixed user text.
pub fn build_exchange(request: &GenerationRequest) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(META_PROMPT),
        ChatMessage::user(user_message(request.task())),
    ]
}
