mod generator;
mod mock;
mod openai;
mod traits;

pub use generator::Generator;
pub use mock::MockCompletion;
pub use openai::{OpenAiService, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use traits::{CompletionService, ServiceError};
