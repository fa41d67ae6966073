//! Model registry: durable list of available models synced from the provider.
//!
//! Sync is a full replace: when the stored set of names differs from the
//! provider's, every row is rewritten in one transaction. Diffing is not
//! worth it here — the model count is small and changes are rare.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use crate::cache::BotCache;
use crate::sqlite_pool::SqlitePoolManager;

/// Sort priority for a model name; lower sorts first.
///
/// "flash-lite" beats "flash" beats "pro"; anything else goes last.
pub fn model_priority(model_name: &str) -> i64 {
    let name = model_name.to_lowercase();
    if name.contains("flash-lite") {
        return 1;
    }
    if name.contains("flash") && !name.contains("lite") {
        return 2;
    }
    if name.contains("pro") {
        return 3;
    }
    100
}

#[derive(Clone)]
pub struct ModelRegistry {
    pool_manager: SqlitePoolManager,
    cache: Arc<BotCache>,
}

impl ModelRegistry {
    pub fn new(pool_manager: SqlitePoolManager, cache: Arc<BotCache>) -> Self {
        Self {
            pool_manager,
            cache,
        }
    }

    /// Reconciles the stored model list with `api_models`.
    ///
    /// No-op when the stored set of names already equals the input set, so
    /// repeated syncs with identical listings perform zero writes. Otherwise
    /// the table is rewritten in one transaction and the model-list cache is
    /// invalidated. Returns whether a rewrite happened.
    pub async fn sync(&self, api_models: &[String]) -> Result<bool, sqlx::Error> {
        let pool = self.pool_manager.pool();

        let stored: Vec<(String,)> =
            sqlx::query_as("SELECT model_name FROM ai_models ORDER BY model_name ASC")
                .fetch_all(pool)
                .await?;

        let stored_set: HashSet<&str> = stored.iter().map(|(name,)| name.as_str()).collect();
        let api_set: HashSet<&str> = api_models.iter().map(|s| s.as_str()).collect();

        if stored_set == api_set {
            info!("Model list already up to date, no sync needed");
            return Ok(false);
        }

        info!("Model lists differ, rewriting ai_models table");

        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM ai_models").execute(&mut *tx).await?;
        for model_name in api_models {
            sqlx::query("INSERT INTO ai_models (model_name, priority) VALUES (?, ?)")
                .bind(model_name)
                .bind(model_priority(model_name))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.cache.models.invalidate();
        info!(count = api_models.len(), "Model table fully rewritten");
        Ok(true)
    }

    /// Returns the active models ordered by (priority, name), cache-checked
    /// (TTL 300s).
    pub async fn list_active(&self) -> Result<Vec<String>, sqlx::Error> {
        if let Some(models) = self.cache.models.get() {
            return Ok(models);
        }

        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT model_name FROM ai_models WHERE is_active = TRUE \
             ORDER BY priority ASC, model_name ASC",
        )
        .fetch_all(self.pool_manager.pool())
        .await?;

        let models: Vec<String> = rows.into_iter().map(|(name,)| name).collect();
        self.cache.models.put(models.clone());
        Ok(models)
    }

    /// Marks one model inactive without removing it. Used by operators to
    /// hide a model from the selection keyboard.
    pub async fn set_active(&self, model_name: &str, active: bool) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE ai_models SET is_active = ? WHERE model_name = ?")
            .bind(active)
            .bind(model_name)
            .execute(self.pool_manager.pool())
            .await?;
        self.cache.models.invalidate();
        Ok(())
    }
}
