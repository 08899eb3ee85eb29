//! Wire types and errors for the DeepSeek API.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One message in a chat conversation. Roles are "system", "user",
/// or "assistant", per the chat-completions convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("DeepSeek returned status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("DeepSeek request timed out")]
    Timeout,

    #[error("DeepSeek API error: {0}")]
    Api(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Response contained no message content")]
    MissingContent,
}
