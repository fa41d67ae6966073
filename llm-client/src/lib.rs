//! LLM provider abstraction with concrete Gemini and Ollama clients.
//!
//! The [`LlmClient`] trait is the seam the rest of the bot talks through:
//! implementations turn a conversation into one generated reply and expose
//! the provider's model listing. [`retry`] wraps any client with timeouts
//! and exponential backoff.

mod error;
mod gemini;
mod ollama;
pub mod retry;

use async_trait::async_trait;

pub use error::ProviderError;
pub use gemini::GeminiClient;
pub use gemini::DEFAULT_GEMINI_BASE_URL;
pub use ollama::{OllamaClient, DEFAULT_OLLAMA_BASE_URL};
pub use retry::{generate_with_retry, RetryPolicy};

/// Who produced a turn of the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

/// One turn of conversation context sent to the provider.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// A text-generation backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generates one reply for the given conversation, last turn being the
    /// user's current message.
    async fn generate(&self, model: &str, turns: &[ChatTurn]) -> Result<String, ProviderError>;

    /// Lists the model names this provider currently serves, already
    /// filtered to the ones the bot can use.
    async fn list_models(&self) -> Result<Vec<String>, ProviderError>;
}

/// Substring filter applied to provider model listings.
///
/// A name is kept when it contains every `require` fragment and none of the
/// `exclude` fragments, case-insensitively.
#[derive(Debug, Clone)]
pub struct ModelFilter {
    require: Vec<String>,
    exclude: Vec<String>,
}

impl ModelFilter {
    pub fn new(require: &[&str], exclude: &[&str]) -> Self {
        Self {
            require: require.iter().map(|s| s.to_lowercase()).collect(),
            exclude: exclude.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// The filter used for Gemini text models: current generation only, no
    /// preview or special-modality variants.
    pub fn gemini_text() -> Self {
        Self::new(
            &["gemini-2.5"],
            &["preview", "audio", "image", "embedding", "vision"],
        )
    }

    pub fn keeps(&self, model_name: &str) -> bool {
        let name = model_name.to_lowercase();
        self.require.iter().all(|frag| name.contains(frag))
            && !self.exclude.iter().any(|frag| name.contains(frag))
    }
}

#[cfg(test)]
mod tests {
    use super::ModelFilter;

    #[test]
    fn test_gemini_text_filter_keeps_stable_text_models() {
        let filter = ModelFilter::gemini_text();
        assert!(filter.keeps("models/gemini-2.5-flash"));
        assert!(filter.keeps("models/gemini-2.5-pro"));
        assert!(filter.keeps("models/gemini-2.5-flash-lite"));
    }

    #[test]
    fn test_gemini_text_filter_drops_other_generations_and_modalities() {
        let filter = ModelFilter::gemini_text();
        assert!(!filter.keeps("models/gemini-1.5-flash"));
        assert!(!filter.keeps("models/gemini-2.5-flash-preview-0514"));
        assert!(!filter.keeps("models/gemini-2.5-flash-native-audio"));
        assert!(!filter.keeps("models/gemini-2.5-flash-image"));
        assert!(!filter.keeps("models/text-embedding-004"));
        assert!(!filter.keeps("models/gemini-2.5-pro-vision"));
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let filter = ModelFilter::gemini_text();
        assert!(filter.keeps("models/Gemini-2.5-Flash"));
        assert!(!filter.keeps("models/GEMINI-2.5-FLASH-PREVIEW"));
    }
}
