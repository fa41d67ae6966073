//! Ollama client for local experimentation (`/api/chat` + `/api/tags`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ProviderError;
use crate::{ChatTurn, LlmClient, TurnRole};

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagInfo>,
}

#[derive(Debug, Deserialize)]
struct TagInfo {
    name: String,
}

/// Client for a local Ollama server.
#[derive(Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn build_request(model: &str, turns: &[ChatTurn]) -> ChatRequest {
        ChatRequest {
            model: model.to_string(),
            messages: turns
                .iter()
                .map(|turn| ChatMessage {
                    role: match turn.role {
                        TurnRole::User => "user".to_string(),
                        TurnRole::Model => "assistant".to_string(),
                    },
                    content: turn.text.clone(),
                })
                .collect(),
            stream: false,
        }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    #[instrument(skip(self, turns), fields(model = %model, turn_count = turns.len()))]
    async fn generate(&self, model: &str, turns: &[ChatTurn]) -> Result<String, ProviderError> {
        let body = Self::build_request(model, turns);
        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), &body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        let text = parsed
            .message
            .map(|m| m.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::InvalidResponse("no message in chat response".to_string())
            })?;

        debug!(reply_len = text.len(), "Ollama reply received");
        Ok(text)
    }

    #[instrument(skip(self))]
    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let response = self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), &body));
        }

        let parsed: TagsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}
