//! Chat model abstraction and client.

mod openai;

pub use openai::OpenAiChat;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

/// One chat message. `content` is either a plain string or an array of
/// typed parts (text segments and inline images), matching the
/// chat-completions wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Value,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Value::String(content.into()),
        }
    }

    pub fn user_parts(parts: Vec<Value>) -> Self {
        Self {
            role: "user".to_string(),
            content: Value::Array(parts),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A hosted chat completion endpoint. One request in, one completion out;
/// failures propagate to the caller and nothing retries.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// The model identifier requests are issued against.
    fn name(&self) -> &str;

    /// Run one completion and return its text.
    async fn complete(&self, request: ChatRequest) -> Result<String, AppError>;
}
