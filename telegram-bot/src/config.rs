//! Environment-driven configuration.
//!
//! Everything comes from the process environment (a `.env` file is loaded
//! by `main` before this runs). Only `BOT_TOKEN`, `OWNER_ID` and the
//! provider credentials are mandatory; the rest has defaults.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use llm_client::RetryPolicy;

/// Which generation backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    /// Local Ollama server, for experiments without burning quota.
    Ollama,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub gemini_api_key: String,
    pub owner_id: i64,
    pub database_url: String,
    pub provider: ProviderKind,
    pub ollama_base_url: String,
    /// Total generation attempts, including the first.
    pub api_retry_attempts: u32,
    /// Per-attempt deadline, seconds.
    pub gemini_api_timeout: u64,
    /// Backoff base, seconds.
    pub api_retry_base_delay: u64,
    /// How many stored messages go into each generation request.
    pub context_message_limit: usize,
    /// Shown to users in failure messages.
    pub owner_contact: String,
    pub log_file: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} is not a valid value: {raw}")),
        Err(_) => Ok(default),
    }
}

impl BotConfig {
    pub fn load() -> Result<Self> {
        let bot_token = env::var("BOT_TOKEN").context("BOT_TOKEN is not set")?;
        let owner_id: i64 = env::var("OWNER_ID")
            .context("OWNER_ID is not set")?
            .parse()
            .context("OWNER_ID is not a valid user id")?;

        let provider = match env_or("LLM_PROVIDER", "gemini").to_lowercase().as_str() {
            "gemini" => ProviderKind::Gemini,
            "ollama" => ProviderKind::Ollama,
            other => anyhow::bail!("LLM_PROVIDER must be 'gemini' or 'ollama', got '{other}'"),
        };

        let gemini_api_key = match provider {
            ProviderKind::Gemini => {
                env::var("GEMINI_API_KEY").context("GEMINI_API_KEY is not set")?
            }
            ProviderKind::Ollama => env_or("GEMINI_API_KEY", ""),
        };

        Ok(Self {
            bot_token,
            gemini_api_key,
            owner_id,
            database_url: env_or("DATABASE_URL", "sqlite:bot.db"),
            provider,
            ollama_base_url: env_or("OLLAMA_BASE_URL", llm_client::DEFAULT_OLLAMA_BASE_URL),
            api_retry_attempts: env_parse("API_RETRY_ATTEMPTS", 3)?,
            gemini_api_timeout: env_parse("GEMINI_API_TIMEOUT", 60)?,
            api_retry_base_delay: env_parse("API_RETRY_BASE_DELAY", 2)?,
            context_message_limit: env_parse("CONTEXT_MESSAGE_LIMIT", 30)?,
            owner_contact: env_or("OWNER_CONTACT", "the bot operator"),
            log_file: env_or("LOG_FILE", "bot.log"),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.api_retry_attempts,
            base_delay: Duration::from_secs(self.api_retry_base_delay),
            request_timeout: Duration::from_secs(self.gemini_api_timeout),
        }
    }
}
