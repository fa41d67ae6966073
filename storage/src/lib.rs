//! Storage crate: SQLite persistence and the in-memory TTL cache layer.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`clock`] – Clock trait (system and manual implementations)
//! - [`cache`] – TtlMap / TtlSlot / BotCache
//! - [`sqlite_pool`] – SqlitePoolManager with startup retry and schema init
//! - [`settings_store`] – Key-value bot settings (cached)
//! - [`model_registry`] – Available model list with priority sync (cached)
//! - [`user_store`] – Users, roles and TTS preferences (cached per field)
//! - [`chat_history`] – Append-only conversation context
//!
//! Every cached read falls back to SQLite on a miss and repopulates the
//! cache; every write invalidates the matching cache entry before it
//! returns, so the next read observes durable state.

mod cache;
mod chat_history;
mod clock;
mod error;
mod model_registry;
mod settings_store;
mod sqlite_pool;
mod user_store;


pub use cache::{BotCache, TtlMap, TtlSlot, MODELS_CACHE_TTL, SETTINGS_CACHE_TTL, USER_CACHE_TTL};
pub use chat_history::{ChatHistoryRepo, ContextMessage};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::StorageError;
pub use model_registry::{model_priority, ModelRegistry};
pub use settings_store::{SettingsStore, SETTING_TEXT_MODEL};
pub use sqlite_pool::SqlitePoolManager;
pub use user_store::{AdminEntry, UserStore};
