use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::ModelConfig;
use crate::errors::AppError;
use super::{ChatModel, ChatRequest};

/// Client for an OpenAI-style `chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiChat {
    base_url: String,
    model: String,
    api_key: String,
    client: Client,
}

impl OpenAiChat {
    pub fn new(config: &ModelConfig, api_key: String) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, AppError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut body = json!({
            "model": self.model,
            "messages": request.messages,
            "stream": false,
        });
        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
            if let Some(t) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(t));
            }
        }

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(AppError::model)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(AppError::Model(format!("chat completion failed: {}", text)));
        }

        let payload: Value = res.json().await.map_err(AppError::model)?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        if content.is_empty() {
            return Err(AppError::Model("empty completion returned".to_string()));
        }

        Ok(content)
    }
}
