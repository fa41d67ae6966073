//! Startup sequence and the teloxide dispatcher.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bot_core::init_tracing;
use llm_client::{GeminiClient, LlmClient, OllamaClient};
use storage::{
    BotCache, ChatHistoryRepo, ModelRegistry, SettingsStore, SqlitePoolManager, SystemClock,
    UserStore,
};
use teloxide::prelude::*;
use teloxide::types::ChatId;
use tracing::{error, info, warn};

use crate::admin_state::AdminSessions;
use crate::config::{BotConfig, ProviderKind};
use crate::handlers::{self, App};
use crate::service::ChatService;

const DB_CONNECT_ATTEMPTS: u32 = 5;
const DB_CONNECT_DELAY: Duration = Duration::from_secs(2);

pub async fn run(config: BotConfig) -> anyhow::Result<()> {
    init_tracing(&config.log_file)?;
    info!("Starting Gemini Telegram bot");

    let pool = SqlitePoolManager::connect_with_retry(
        &config.database_url,
        DB_CONNECT_ATTEMPTS,
        DB_CONNECT_DELAY,
    )
    .await
    .context("Could not open the database")?;
    pool.init_schema().await.context("Schema creation failed")?;

    let cache = Arc::new(BotCache::new(Arc::new(SystemClock)));
    let settings = SettingsStore::new(pool.clone(), cache.clone());
    let registry = ModelRegistry::new(pool.clone(), cache.clone());
    let users = UserStore::new(pool.clone(), cache.clone(), config.owner_id);
    let history = ChatHistoryRepo::new(pool.clone());

    let llm: Arc<dyn LlmClient> = match config.provider {
        ProviderKind::Gemini => Arc::new(GeminiClient::new(config.gemini_api_key.clone())),
        ProviderKind::Ollama => {
            info!(base_url = %config.ollama_base_url, "Using local Ollama backend");
            Arc::new(OllamaClient::new(config.ollama_base_url.clone()))
        }
    };

    let service = Arc::new(ChatService::new(
        settings.clone(),
        registry.clone(),
        history.clone(),
        llm,
        config.retry_policy(),
        config.context_message_limit,
        config.owner_contact.clone(),
    ));

    // Model refresh needs the provider up; the bot can still serve the
    // stored list if it is down.
    match service.refresh_available_models().await {
        Ok(changed) => info!(changed = changed, "Model list refreshed"),
        Err(e) => warn!(error = %e, "Could not refresh models at startup"),
    }

    warm_caches(&registry, &settings, &users).await;

    let app = App {
        users,
        settings,
        registry,
        history,
        service,
        sessions: Arc::new(AdminSessions::new()),
    };

    let bot = Bot::new(config.bot_token.clone());
    if let Err(e) = bot
        .send_message(ChatId(config.owner_id), "Bot started and ready.")
        .await
    {
        warn!(error = %e, "Could not notify the owner");
    }

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(
            |bot: Bot, app: App, msg: Message| async move {
                if let Err(e) = handlers::handle_message(bot, app, msg).await {
                    error!(error = %e, "Message handler failed");
                }
                Ok::<(), anyhow::Error>(())
            },
        ))
        .branch(Update::filter_callback_query().endpoint(
            |bot: Bot, app: App, q: CallbackQuery| async move {
                if let Err(e) = handlers::handle_callback(bot, app, q).await {
                    error!(error = %e, "Callback handler failed");
                }
                Ok::<(), anyhow::Error>(())
            },
        ));

    info!(owner_id = config.owner_id, "Dispatcher starting");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![app])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// Pre-fills the caches so the first user interactions skip the database.
async fn warm_caches(registry: &ModelRegistry, settings: &SettingsStore, users: &UserStore) {
    if let Err(e) = registry.list_active().await {
        warn!(error = %e, "Cache warm-up: model list failed");
    }
    if let Err(e) = settings.text_model_name().await {
        warn!(error = %e, "Cache warm-up: current model failed");
    }

    match users.user_ids().await {
        Ok(ids) => {
            let count = ids.len();
            for id in ids {
                if users.role_of(id).await.is_err() || users.tts_settings(id).await.is_err() {
                    warn!(user_id = id, "Cache warm-up failed for user");
                }
            }
            info!(users = count, "Caches warmed");
        }
        Err(e) => warn!(error = %e, "Cache warm-up: user listing failed"),
    }
}
