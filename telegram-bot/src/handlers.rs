//! Message and callback handlers.

use std::sync::Arc;

use bot_core::{Role, TgUser, TtsVoice};
use storage::{ChatHistoryRepo, SettingsStore, UserStore};
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ChatAction, Message};
use tracing::{info, warn};

use crate::admin_state::{AdminAction, AdminSessions};
use crate::keyboards;
use crate::messages;
use crate::service::ChatService;

/// Everything the handlers need, shared through dptree dependencies.
#[derive(Clone)]
pub struct App {
    pub users: UserStore,
    pub settings: SettingsStore,
    pub registry: storage::ModelRegistry,
    pub history: ChatHistoryRepo,
    pub service: Arc<ChatService>,
    pub sessions: Arc<AdminSessions>,
}

fn to_tg_user(user: &teloxide::types::User) -> TgUser {
    TgUser {
        id: user.id.0 as i64,
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()),
        last_name: user.last_name.clone(),
    }
}

pub async fn handle_message(bot: Bot, app: App, msg: Message) -> anyhow::Result<()> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = from.id.0 as i64;

    app.users.register_if_not_exists(&to_tg_user(from)).await?;

    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, messages::TEXT_ONLY).await?;
        return Ok(());
    };
    let text = text.trim();
    let role = app.users.role_of(user_id).await?;

    if text == "/cancel" {
        app.sessions.clear(user_id);
        bot.send_message(msg.chat.id, messages::CANCELLED)
            .reply_markup(keyboards::main_menu(role))
            .await?;
        return Ok(());
    }

    // A pending admin dialog consumes the message before anything else.
    if let Some(action) = app.sessions.take(user_id) {
        return handle_admin_id_input(bot, app, msg.chat.id, user_id, role, action, text).await;
    }

    match text {
        "/start" => {
            bot.send_message(msg.chat.id, messages::WELCOME)
                .reply_markup(keyboards::main_menu(role))
                .await?;
        }
        messages::BTN_BACK => {
            bot.send_message(msg.chat.id, "Main menu.")
                .reply_markup(keyboards::main_menu(role))
                .await?;
        }
        messages::BTN_SETTINGS => {
            let tts = app.users.tts_settings(user_id).await?;
            bot.send_message(msg.chat.id, "Settings:")
                .reply_markup(keyboards::settings_menu(&tts))
                .await?;
        }
        messages::BTN_TTS_ENABLE | messages::BTN_TTS_DISABLE => {
            let enable = text == messages::BTN_TTS_ENABLE;
            app.users.set_tts_enabled(user_id, enable).await?;
            let tts = app.users.tts_settings(user_id).await?;
            let status = if enable { "enabled" } else { "disabled" };
            bot.send_message(msg.chat.id, format!("Voice replies {status}."))
                .reply_markup(keyboards::settings_menu(&tts))
                .await?;
        }
        messages::BTN_VOICE_MALE | messages::BTN_VOICE_FEMALE => {
            let voice = if text == messages::BTN_VOICE_MALE {
                TtsVoice::Male
            } else {
                TtsVoice::Female
            };
            app.users.set_tts_voice(user_id, voice).await?;
            let tts = app.users.tts_settings(user_id).await?;
            bot.send_message(msg.chat.id, format!("Voice set to {}.", voice.as_str()))
                .reply_markup(keyboards::settings_menu(&tts))
                .await?;
        }
        messages::BTN_CLEAR_CONTEXT => {
            let deleted = app.history.clear(user_id).await?;
            info!(user_id = user_id, deleted = deleted, "Context cleared by user");
            bot.send_message(msg.chat.id, messages::CONTEXT_CLEARED)
                .await?;
        }
        messages::BTN_ADMIN_PANEL => {
            let Some(role) = role.filter(|r| bot_core::has_role(*r, Role::Admin)) else {
                bot.send_message(msg.chat.id, messages::NOT_ALLOWED).await?;
                return Ok(());
            };
            bot.send_message(msg.chat.id, "Admin panel:")
                .reply_markup(keyboards::admin_menu(role))
                .await?;
        }
        messages::BTN_CHANGE_MODEL => {
            if !app.users.is_admin(user_id).await? {
                bot.send_message(msg.chat.id, messages::NOT_ALLOWED).await?;
                return Ok(());
            }
            let models = app.registry.list_active().await?;
            if models.is_empty() {
                bot.send_message(msg.chat.id, "The model list is empty; try again later.")
                    .await?;
                return Ok(());
            }
            let current = app.settings.text_model_name().await?;
            bot.send_message(msg.chat.id, "Choose the model:")
                .reply_markup(keyboards::model_selection(&models, &current))
                .await?;
        }
        messages::BTN_MANAGE_ADMINS => {
            if role != Some(Role::Owner) {
                bot.send_message(msg.chat.id, messages::OWNER_ONLY).await?;
                return Ok(());
            }
            bot.send_message(msg.chat.id, "Admin management:")
                .reply_markup(keyboards::admin_manage_menu())
                .await?;
        }
        messages::BTN_ADD_ADMIN | messages::BTN_REMOVE_ADMIN => {
            if role != Some(Role::Owner) {
                bot.send_message(msg.chat.id, messages::OWNER_ONLY).await?;
                return Ok(());
            }
            let (action, prompt) = if text == messages::BTN_ADD_ADMIN {
                (AdminAction::AwaitingAdminIdToAdd, messages::ASK_ADMIN_ID_TO_ADD)
            } else {
                (
                    AdminAction::AwaitingAdminIdToRemove,
                    messages::ASK_ADMIN_ID_TO_REMOVE,
                )
            };
            app.sessions.set(user_id, action);
            bot.send_message(msg.chat.id, prompt).await?;
        }
        messages::BTN_LIST_ADMINS => {
            if role != Some(Role::Owner) {
                bot.send_message(msg.chat.id, messages::OWNER_ONLY).await?;
                return Ok(());
            }
            let admins = app.users.list_admins().await?;
            let listing = admins
                .iter()
                .map(|a| format!("{} — {}", a.user_id, a.role.as_str()))
                .collect::<Vec<_>>()
                .join("\n");
            bot.send_message(msg.chat.id, format!("Current admins:\n{listing}"))
                .await?;
        }
        prompt => {
            bot.send_chat_action(msg.chat.id, ChatAction::Typing).await?;
            let reply = app.service.respond(user_id, prompt).await;
            for chunk in messages::split_message(&reply) {
                bot.send_message(msg.chat.id, chunk).await?;
            }
        }
    }

    Ok(())
}

/// Second step of the add/remove admin dialog: the owner sends a user id.
async fn handle_admin_id_input(
    bot: Bot,
    app: App,
    chat_id: ChatId,
    user_id: i64,
    role: Option<Role>,
    action: AdminAction,
    text: &str,
) -> anyhow::Result<()> {
    if role != Some(Role::Owner) {
        bot.send_message(chat_id, messages::OWNER_ONLY).await?;
        return Ok(());
    }

    let Ok(target) = text.parse::<i64>() else {
        // Keep the dialog open for another try.
        app.sessions.set(user_id, action);
        bot.send_message(chat_id, messages::NOT_A_USER_ID).await?;
        return Ok(());
    };

    let reply = match action {
        AdminAction::AwaitingAdminIdToAdd => {
            if app.users.add_admin(target).await? {
                info!(target = target, "Admin added");
                format!("User {target} is now an admin.")
            } else {
                format!("Can't promote {target}: unknown user, already an admin, or the owner.")
            }
        }
        AdminAction::AwaitingAdminIdToRemove => {
            if app.users.remove_admin(target).await? {
                info!(target = target, "Admin removed");
                format!("User {target} is no longer an admin.")
            } else {
                format!("Can't demote {target}: not an admin, or the owner.")
            }
        }
    };

    bot.send_message(chat_id, reply)
        .reply_markup(keyboards::admin_manage_menu())
        .await?;
    Ok(())
}

pub async fn handle_callback(bot: Bot, app: App, q: CallbackQuery) -> anyhow::Result<()> {
    let user_id = q.from.id.0 as i64;
    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    bot.answer_callback_query(q.id.clone()).await?;

    if let Some(model_name) = data.strip_prefix(keyboards::CB_SET_MODEL) {
        if !app.users.is_admin(user_id).await? {
            warn!(user_id = user_id, "Model change attempt by non-admin");
            return Ok(());
        }

        let applied = app
            .settings
            .set_text_model(&app.registry, model_name)
            .await?;
        let text = if applied {
            let display = model_name.strip_prefix("models/").unwrap_or(model_name);
            format!("Model set to {display}.")
        } else {
            "That model is not available any more; reopen the list.".to_string()
        };

        if let Some(message) = q.message.as_ref().and_then(|m| m.regular_message()) {
            let models = app.registry.list_active().await?;
            let current = app.settings.text_model_name().await?;
            bot.edit_message_text(message.chat.id, message.id, text)
                .reply_markup(keyboards::model_selection(&models, &current))
                .await?;
        }
    }

    Ok(())
}
