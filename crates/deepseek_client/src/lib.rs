//! DeepSeek chat-completions client.

mod client;
mod types;

pub use client::DeepSeekClient;
pub use types::{ChatMessage, LlmError};
