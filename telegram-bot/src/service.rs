//! Chat service: storage + provider composed into one "answer this user"
//! operation.
//!
//! `respond` is deliberately infallible: whatever goes wrong, the handler
//! gets back a sendable message and the details stay in the logs.

use std::sync::Arc;

use bot_core::ChatRole;
use llm_client::{generate_with_retry, ChatTurn, LlmClient, ProviderError, RetryPolicy};
use storage::{ChatHistoryRepo, ModelRegistry, SettingsStore};
use tracing::{error, info, warn};

use crate::messages;

pub struct ChatService {
    settings: SettingsStore,
    registry: ModelRegistry,
    history: ChatHistoryRepo,
    llm: Arc<dyn LlmClient>,
    retry: RetryPolicy,
    context_limit: usize,
    owner_contact: String,
}

impl ChatService {
    pub fn new(
        settings: SettingsStore,
        registry: ModelRegistry,
        history: ChatHistoryRepo,
        llm: Arc<dyn LlmClient>,
        retry: RetryPolicy,
        context_limit: usize,
        owner_contact: String,
    ) -> Self {
        Self {
            settings,
            registry,
            history,
            llm,
            retry,
            context_limit,
            owner_contact,
        }
    }

    /// Pulls the provider's model listing and reconciles the registry.
    pub async fn refresh_available_models(&self) -> anyhow::Result<bool> {
        let models = self.llm.list_models().await?;
        info!(count = models.len(), "Fetched provider model listing");
        Ok(self.registry.sync(&models).await?)
    }

    /// Resolves the model to generate with, falling back to the first
    /// active one (and persisting the fallback) when the configured model
    /// is unset or gone.
    async fn resolve_model(&self) -> Result<Option<String>, sqlx::Error> {
        let active = self.registry.list_active().await?;
        let Some(first) = active.first() else {
            return Ok(None);
        };

        let configured = self.settings.text_model_name().await?;
        if active.iter().any(|m| *m == configured) {
            return Ok(Some(configured));
        }

        warn!(
            configured = %configured,
            fallback = %first,
            "Configured model is not active, falling back"
        );
        self.settings.set_text_model(&self.registry, first).await?;
        Ok(Some(first.clone()))
    }

    /// Answers one user message. Always returns sendable text.
    pub async fn respond(&self, user_id: i64, prompt: &str) -> String {
        let model = match self.resolve_model().await {
            Ok(Some(model)) => model,
            Ok(None) => {
                warn!(user_id = user_id, "No active models configured");
                return messages::no_models_configured(&self.owner_contact);
            }
            Err(e) => {
                error!(user_id = user_id, error = %e, "Failed to resolve model");
                return messages::generic_failure(&self.owner_contact);
            }
        };

        let mut turns = match self.history.context(user_id).await {
            Ok(stored) => {
                let skip = stored.len().saturating_sub(self.context_limit);
                stored
                    .into_iter()
                    .skip(skip)
                    .map(|m| ChatTurn {
                        role: match m.role {
                            ChatRole::User => llm_client::TurnRole::User,
                            ChatRole::Model => llm_client::TurnRole::Model,
                        },
                        text: m.content,
                    })
                    .collect::<Vec<_>>()
            }
            Err(e) => {
                error!(user_id = user_id, error = %e, "Failed to load chat context");
                return messages::generic_failure(&self.owner_contact);
            }
        };
        turns.push(ChatTurn::user(prompt));

        match generate_with_retry(self.llm.as_ref(), &self.retry, &model, &turns).await {
            Ok(reply) => {
                // Persist the exchange in arrival order. A failure here
                // must not cost the user their answer.
                if let Err(e) = self.history.append(user_id, ChatRole::User, prompt).await {
                    error!(user_id = user_id, error = %e, "Failed to store user message");
                } else if let Err(e) = self.history.append(user_id, ChatRole::Model, &reply).await {
                    error!(user_id = user_id, error = %e, "Failed to store model reply");
                }
                reply
            }
            Err(ProviderError::ModelNotFound(detail)) => {
                warn!(user_id = user_id, model = %model, detail = %detail, "Model vanished, refreshing listing");
                if let Err(e) = self.refresh_available_models().await {
                    error!(error = %e, "Model list refresh failed");
                }
                messages::model_not_found_reply(&self.owner_contact)
            }
            Err(e) => {
                error!(user_id = user_id, model = %model, error = %e, "Generation failed");
                messages::generic_failure(&self.owner_contact)
            }
        }
    }
}
