//! Gemini REST client (`generateContent` + model listing).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ProviderError;
use crate::{ChatTurn, LlmClient, ModelFilter, TurnRole};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;
const LIST_MODELS_PAGE_SIZE: u32 = 200;

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
    /// Set on reasoning parts that must not reach the user.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    thought: bool,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
    #[serde(rename = "nextPageToken", default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
    #[serde(rename = "supportedGenerationMethods", default)]
    supported_generation_methods: Vec<String>,
}

/// Client for the Gemini `v1beta` REST API.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    filter: ModelFilter,
    temperature: f64,
    max_output_tokens: u32,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_GEMINI_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            filter: ModelFilter::gemini_text(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Builds `{base}/v1beta/models/{model}:generateContent`, accepting both
    /// bare names and registry-style `models/...` names.
    fn generate_url(&self, model: &str) -> String {
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };
        format!(
            "{}/v1beta/{}:generateContent?key={}",
            self.base_url, model_path, self.api_key
        )
    }

    fn build_request(&self, turns: &[ChatTurn]) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: turns
                .iter()
                .map(|turn| Content {
                    role: match turn.role {
                        TurnRole::User => "user".to_string(),
                        TurnRole::Model => "model".to_string(),
                    },
                    parts: vec![Part {
                        text: turn.text.clone(),
                        thought: false,
                    }],
                })
                .collect(),
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }
}

/// Concatenates the visible text parts of the first candidate.
fn extract_text(response: &GenerateContentResponse) -> Result<String, ProviderError> {
    let content = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .ok_or_else(|| ProviderError::InvalidResponse("no candidates in response".to_string()))?;

    let text: String = content
        .parts
        .iter()
        .filter(|part| !part.thought)
        .map(|part| part.text.as_str())
        .collect();

    if text.trim().is_empty() {
        return Err(ProviderError::InvalidResponse(
            "candidate contained no visible text".to_string(),
        ));
    }
    Ok(text)
}

#[async_trait]
impl LlmClient for GeminiClient {
    #[instrument(skip(self, turns), fields(model = %model, turn_count = turns.len()))]
    async fn generate(&self, model: &str, turns: &[ChatTurn]) -> Result<String, ProviderError> {
        let body = self.build_request(turns);
        let response = self
            .http
            .post(self.generate_url(model))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), &body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        let text = extract_text(&parsed)?;
        debug!(reply_len = text.len(), "Gemini reply received");
        Ok(text)
    }

    /// Fetches the full model catalogue. The listing endpoint is paged
    /// (`pageSize` capped server-side, `nextPageToken` chains pages), so
    /// every page is walked before filtering.
    #[instrument(skip(self))]
    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut url = format!(
                "{}/v1beta/models?key={}&pageSize={}",
                self.base_url, self.api_key, LIST_MODELS_PAGE_SIZE
            );
            if let Some(token) = &page_token {
                url.push_str("&pageToken=");
                url.push_str(token);
            }

            let response = self.http.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ProviderError::from_status(status.as_u16(), &body));
            }

            let parsed: ListModelsResponse = response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
            pages += 1;

            models.extend(
                parsed
                    .models
                    .into_iter()
                    .filter(|m| {
                        m.supported_generation_methods
                            .iter()
                            .any(|method| method == "generateContent")
                    })
                    .map(|m| m.name)
                    .filter(|name| self.filter.keeps(name)),
            );

            match parsed.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(count = models.len(), pages = pages, "Gemini model listing fetched");
        Ok(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::with_base_url("test-key".to_string(), "http://localhost:1234".to_string())
    }

    #[test]
    fn test_generate_url_accepts_both_name_forms() {
        let c = client();
        let expected = "http://localhost:1234/v1beta/models/gemini-2.5-flash:generateContent?key=test-key";
        assert_eq!(c.generate_url("gemini-2.5-flash"), expected);
        assert_eq!(c.generate_url("models/gemini-2.5-flash"), expected);
    }

    #[test]
    fn test_request_body_shape() {
        let c = client();
        let turns = vec![ChatTurn::user("hi"), ChatTurn::model("hello"), ChatTurn::user("bye")];
        let body = serde_json::to_value(c.build_request(&turns)).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][2]["parts"][0]["text"], "bye");
        assert_eq!(body["generationConfig"]["temperature"], 0.7);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
        // Thought flags never go out on requests.
        assert!(body["contents"][0]["parts"][0].get("thought").is_none());
    }

    #[test]
    fn test_listing_page_carries_continuation_token() {
        let page: ListModelsResponse = serde_json::from_value(serde_json::json!({
            "models": [
                {"name": "models/gemini-2.5-flash", "supportedGenerationMethods": ["generateContent"]},
                {"name": "models/text-embedding-004", "supportedGenerationMethods": ["embedContent"]}
            ],
            "nextPageToken": "token-for-page-2"
        }))
        .unwrap();

        assert_eq!(page.models.len(), 2);
        assert_eq!(page.next_page_token.as_deref(), Some("token-for-page-2"));
    }

    #[test]
    fn test_final_listing_page_has_no_token() {
        let page: ListModelsResponse = serde_json::from_value(serde_json::json!({
            "models": [
                {"name": "models/gemini-2.5-pro", "supportedGenerationMethods": ["generateContent"]}
            ]
        }))
        .unwrap();

        assert_eq!(page.models.len(), 1);
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_extract_text_skips_thought_parts() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "internal reasoning", "thought": true},
                        {"text": "Hello, "},
                        {"text": "world!"}
                    ]
                }
            }]
        }))
        .unwrap();

        assert_eq!(extract_text(&response).unwrap(), "Hello, world!");
    }

    #[test]
    fn test_extract_text_rejects_empty_candidates() {
        let response: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({"candidates": []})).unwrap();
        assert!(matches!(
            extract_text(&response),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_extract_text_rejects_thought_only_candidate() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "only reasoning", "thought": true}]
                }
            }]
        }))
        .unwrap();
        assert!(matches!(
            extract_text(&response),
            Err(ProviderError::InvalidResponse(_))
        ));
    }
}
