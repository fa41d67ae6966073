//! Append-only conversation context per user.
//!
//! Not cached: history is read once per generation request and the row set
//! changes on every exchange.

use bot_core::ChatRole;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::sqlite_pool::SqlitePoolManager;

/// One stored conversation message.
#[derive(Debug, Clone)]
pub struct ContextMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Clone)]
pub struct ChatHistoryRepo {
    pool_manager: SqlitePoolManager,
}

impl ChatHistoryRepo {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    /// Appends one message to the user's history.
    pub async fn append(
        &self,
        user_id: i64,
        role: ChatRole,
        content: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO chat_history (user_id, role, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(role.as_str())
        .bind(content)
        .bind(Utc::now())
        .execute(self.pool_manager.pool())
        .await?;
        Ok(())
    }

    /// Returns the full history in arrival order (timestamp, then insert id
    /// as tiebreak for same-instant rows).
    pub async fn context(&self, user_id: i64) -> Result<Vec<ContextMessage>, sqlx::Error> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT role, content FROM chat_history WHERE user_id = ? \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(self.pool_manager.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(role, content)| ContextMessage {
                role: ChatRole::parse(&role),
                content,
            })
            .collect())
    }

    /// Deletes the user's whole history ("clear context").
    pub async fn clear(&self, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chat_history WHERE user_id = ?")
            .bind(user_id)
            .execute(self.pool_manager.pool())
            .await?;

        info!(
            user_id = user_id,
            deleted = result.rows_affected(),
            "Cleared chat context"
        );
        Ok(result.rows_affected())
    }

    /// Timestamp of the oldest stored message, if any. Used by maintenance
    /// tooling and tests.
    pub async fn oldest(&self, user_id: i64) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
        let row: Option<(DateTime<Utc>,)> = sqlx::query_as(
            "SELECT created_at FROM chat_history WHERE user_id = ? \
             ORDER BY created_at ASC, id ASC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        Ok(row.map(|(t,)| t))
    }
}
