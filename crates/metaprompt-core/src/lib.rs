pub mod error;
pub mod message;
pub mod request;
pub mod session;

pub use error::MetapromptError;
pub use message::{ChatMessage, Role};
pub use request::GenerationRequest;
pub use session::SessionState;
