//! Key-value bot settings, read through the TTL cache.
//!
//! Writes go straight to SQLite and invalidate the cached entry before
//! returning, so a `get` immediately after `set` observes the new value.

use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::BotCache;
use crate::model_registry::ModelRegistry;
use crate::sqlite_pool::SqlitePoolManager;

/// Settings key holding the name of the model used for text generation.
pub const SETTING_TEXT_MODEL: &str = "current_text_model";

#[derive(Clone)]
pub struct SettingsStore {
    pool_manager: SqlitePoolManager,
    cache: Arc<BotCache>,
}

impl SettingsStore {
    pub fn new(pool_manager: SqlitePoolManager, cache: Arc<BotCache>) -> Self {
        Self {
            pool_manager,
            cache,
        }
    }

    /// Returns the setting value, consulting the cache first (TTL 60s).
    pub async fn get(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        if let Some(value) = self.cache.settings.get(&key.to_string()) {
            return Ok(Some(value));
        }

        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM bot_config WHERE key = ?")
                .bind(key)
                .fetch_optional(self.pool_manager.pool())
                .await?;

        if let Some((value,)) = &row {
            self.cache.settings.put(key.to_string(), value.clone());
        }
        Ok(row.map(|(value,)| value))
    }

    /// Upserts the setting, then invalidates its cache entry.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO bot_config (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(self.pool_manager.pool())
        .await?;

        self.cache.settings.invalidate(&key.to_string());
        Ok(())
    }

    /// Returns the current text-model name, or an empty string when unset.
    pub async fn text_model_name(&self) -> Result<String, sqlx::Error> {
        Ok(self.get(SETTING_TEXT_MODEL).await?.unwrap_or_default())
    }

    /// Sets the text model by its full name, refusing names that are not in
    /// the active model list. Returns whether the change was applied.
    pub async fn set_text_model(
        &self,
        registry: &ModelRegistry,
        model_name: &str,
    ) -> Result<bool, sqlx::Error> {
        let available = registry.list_active().await?;
        if available.iter().any(|m| m == model_name) {
            self.set(SETTING_TEXT_MODEL, model_name).await?;
            info!(model = %model_name, "Global text model changed");
            Ok(true)
        } else {
            warn!(model = %model_name, "Attempt to set unavailable model");
            Ok(false)
        }
    }
}
