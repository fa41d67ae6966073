//! Core crate: shared types, errors and logging for the bot.
//!
//! ## Modules
//!
//! - [`error`] – Top-level error types
//! - [`logger`] – Tracing initialization (console + file)
//! - [`types`] – TgUser, Role, TtsSettings, ChatRole

mod error;
mod logger;
mod types;

pub use error::{BotError, Result};
pub use logger::init_tracing;
pub use types::{has_role, ChatRole, Role, TgUser, TtsSettings, TtsVoice};
