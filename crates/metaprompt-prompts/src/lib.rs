pub mod exchange;
pub mod meta;

pub use exchange::{build_exchange, user_message, USER_PREFIX};
pub use meta::META_PROMPT;
