//! Users, roles and TTS preferences.
//!
//! Role and TTS reads go through per-user cache sub-entries (TTL 120s);
//! each write invalidates only the field it touched, leaving the sibling
//! entry intact.

use std::sync::Arc;

use bot_core::{Role, TgUser, TtsSettings, TtsVoice};
use chrono::Utc;
use tracing::info;

use crate::cache::BotCache;
use crate::sqlite_pool::SqlitePoolManager;

/// One row of the admin listing: user id plus role.
#[derive(Debug, Clone)]
pub struct AdminEntry {
    pub user_id: i64,
    pub role: Role,
}

#[derive(Clone)]
pub struct UserStore {
    pool_manager: SqlitePoolManager,
    cache: Arc<BotCache>,
    owner_id: i64,
}

impl UserStore {
    pub fn new(pool_manager: SqlitePoolManager, cache: Arc<BotCache>, owner_id: i64) -> Self {
        Self {
            pool_manager,
            cache,
            owner_id,
        }
    }

    /// Creates the user on first contact. The configured owner id always
    /// resolves to the owner role, including after a manual demotion.
    pub async fn register_if_not_exists(&self, user: &TgUser) -> Result<(), sqlx::Error> {
        let pool = self.pool_manager.pool();

        let existing: Option<(String,)> =
            sqlx::query_as("SELECT role FROM users WHERE user_id = ?")
                .bind(user.id)
                .fetch_optional(pool)
                .await?;

        match existing {
            None => {
                let role = if user.id == self.owner_id {
                    Role::Owner
                } else {
                    Role::User
                };
                sqlx::query(
                    r#"
                    INSERT INTO users (user_id, username, first_name, last_name, role, created_at)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(user.id)
                .bind(&user.username)
                .bind(&user.first_name)
                .bind(&user.last_name)
                .bind(role.as_str())
                .bind(Utc::now())
                .execute(pool)
                .await?;

                info!(
                    user_id = user.id,
                    role = role.as_str(),
                    "Registered new user"
                );
            }
            Some((role,)) if user.id == self.owner_id && Role::parse(&role) != Role::Owner => {
                self.update_role(user.id, Role::Owner).await?;
                info!(user_id = user.id, "Owner role restored");
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// Returns the user's role, cache-checked (TTL 120s). `None` for
    /// unregistered users.
    pub async fn role_of(&self, user_id: i64) -> Result<Option<Role>, sqlx::Error> {
        if let Some(role) = self.cache.roles.get(&user_id) {
            return Ok(Some(role));
        }

        let row: Option<(String,)> = sqlx::query_as("SELECT role FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(self.pool_manager.pool())
            .await?;

        let role = row.map(|(r,)| Role::parse(&r));
        if let Some(role) = role {
            self.cache.roles.put(user_id, role);
        }
        Ok(role)
    }

    /// Writes the role, then invalidates the cached role entry only.
    pub async fn update_role(&self, user_id: i64, role: Role) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET role = ? WHERE user_id = ?")
            .bind(role.as_str())
            .bind(user_id)
            .execute(self.pool_manager.pool())
            .await?;

        self.cache.roles.invalidate(&user_id);
        info!(user_id = user_id, role = role.as_str(), "User role updated");
        Ok(())
    }

    /// Whether the user may use the admin panel.
    pub async fn is_admin(&self, user_id: i64) -> Result<bool, sqlx::Error> {
        Ok(self
            .role_of(user_id)
            .await?
            .map(|role| bot_core::has_role(role, Role::Admin))
            .unwrap_or(false))
    }

    /// Promotes a user to admin. Returns false when the target is the owner
    /// or already an admin.
    pub async fn add_admin(&self, user_id: i64) -> Result<bool, sqlx::Error> {
        if user_id == self.owner_id {
            return Ok(false);
        }
        match self.role_of(user_id).await? {
            Some(Role::Admin) | None => Ok(false),
            _ => {
                self.update_role(user_id, Role::Admin).await?;
                Ok(true)
            }
        }
    }

    /// Demotes an admin back to user. Returns false when the target is the
    /// owner or not an admin.
    pub async fn remove_admin(&self, user_id: i64) -> Result<bool, sqlx::Error> {
        if user_id == self.owner_id {
            return Ok(false);
        }
        match self.role_of(user_id).await? {
            Some(Role::Admin) => {
                self.update_role(user_id, Role::User).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// All admins and the owner.
    pub async fn list_admins(&self) -> Result<Vec<AdminEntry>, sqlx::Error> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT user_id, role FROM users WHERE role IN ('admin', 'owner') ORDER BY user_id",
        )
        .fetch_all(self.pool_manager.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, role)| AdminEntry {
                user_id,
                role: Role::parse(&role),
            })
            .collect())
    }

    /// Returns the user's TTS preferences, cache-checked (TTL 120s).
    /// Unknown users get the defaults.
    pub async fn tts_settings(&self, user_id: i64) -> Result<TtsSettings, sqlx::Error> {
        if let Some(settings) = self.cache.tts.get(&user_id) {
            return Ok(settings);
        }

        let row: Option<(bool, String)> =
            sqlx::query_as("SELECT tts_enabled, tts_voice FROM users WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(self.pool_manager.pool())
                .await?;

        let settings = row
            .map(|(enabled, voice)| TtsSettings {
                enabled,
                voice: TtsVoice::parse(&voice),
            })
            .unwrap_or_default();
        self.cache.tts.put(user_id, settings);
        Ok(settings)
    }

    /// Toggles TTS, then invalidates the cached TTS entry only.
    pub async fn set_tts_enabled(&self, user_id: i64, enabled: bool) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET tts_enabled = ? WHERE user_id = ?")
            .bind(enabled)
            .bind(user_id)
            .execute(self.pool_manager.pool())
            .await?;
        self.cache.tts.invalidate(&user_id);
        Ok(())
    }

    /// Changes the TTS voice, then invalidates the cached TTS entry only.
    pub async fn set_tts_voice(&self, user_id: i64, voice: TtsVoice) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET tts_voice = ? WHERE user_id = ?")
            .bind(voice.as_str())
            .bind(user_id)
            .execute(self.pool_manager.pool())
            .await?;
        self.cache.tts.invalidate(&user_id);
        Ok(())
    }

    /// Ids of every registered user; used for cache warm-up at startup.
    pub async fn user_ids(&self) -> Result<Vec<i64>, sqlx::Error> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT user_id FROM users")
            .fetch_all(self.pool_manager.pool())
            .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
