//! Reply and inline keyboards.

use bot_core::{Role, TtsSettings, TtsVoice};
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
};

use crate::messages::*;

/// Callback-data prefix for model selection buttons.
pub const CB_SET_MODEL: &str = "set_model:";

fn rows(labels: Vec<Vec<&str>>) -> KeyboardMarkup {
    KeyboardMarkup::new(
        labels
            .into_iter()
            .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>())
            .collect::<Vec<_>>(),
    )
}

/// Main menu; admins get an extra row with the admin panel.
pub fn main_menu(role: Option<Role>) -> KeyboardMarkup {
    let mut layout = vec![vec![BTN_SETTINGS]];
    if role.is_some_and(|r| bot_core::has_role(r, Role::Admin)) {
        layout.push(vec![BTN_ADMIN_PANEL]);
    }
    rows(layout)
}

/// Settings menu. The TTS toggle shows the action, not the state.
pub fn settings_menu(tts: &TtsSettings) -> KeyboardMarkup {
    let toggle = if tts.enabled {
        BTN_TTS_DISABLE
    } else {
        BTN_TTS_ENABLE
    };
    let voice = match tts.voice {
        TtsVoice::Male => BTN_VOICE_FEMALE,
        TtsVoice::Female => BTN_VOICE_MALE,
    };
    rows(vec![vec![toggle, voice], vec![BTN_CLEAR_CONTEXT], vec![BTN_BACK]])
}

/// Admin panel; only the owner sees admin management.
pub fn admin_menu(role: Role) -> KeyboardMarkup {
    let mut layout = vec![vec![BTN_CHANGE_MODEL]];
    if role == Role::Owner {
        layout.push(vec![BTN_MANAGE_ADMINS]);
    }
    layout.push(vec![BTN_BACK]);
    rows(layout)
}

pub fn admin_manage_menu() -> KeyboardMarkup {
    rows(vec![
        vec![BTN_ADD_ADMIN, BTN_REMOVE_ADMIN],
        vec![BTN_LIST_ADMINS],
        vec![BTN_BACK],
    ])
}

/// One button per active model, current one marked. Callback data carries
/// the full registry name.
pub fn model_selection(models: &[String], current: &str) -> InlineKeyboardMarkup {
    let buttons: Vec<Vec<InlineKeyboardButton>> = models
        .iter()
        .map(|name| {
            let display = name.strip_prefix("models/").unwrap_or(name);
            let label = if name == current {
                format!("✅ {display}")
            } else {
                display.to_string()
            };
            vec![InlineKeyboardButton::callback(
                label,
                format!("{CB_SET_MODEL}{name}"),
            )]
        })
        .collect();
    InlineKeyboardMarkup::new(buttons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn labels(kb: &KeyboardMarkup) -> Vec<String> {
        kb.keyboard
            .iter()
            .flatten()
            .map(|b| b.text.clone())
            .collect()
    }

    #[test]
    fn test_main_menu_hides_admin_panel_from_users() {
        let user_kb = labels(&main_menu(Some(Role::User)));
        assert!(user_kb.contains(&BTN_SETTINGS.to_string()));
        assert!(!user_kb.contains(&BTN_ADMIN_PANEL.to_string()));

        let admin_kb = labels(&main_menu(Some(Role::Admin)));
        assert!(admin_kb.contains(&BTN_ADMIN_PANEL.to_string()));

        let owner_kb = labels(&main_menu(Some(Role::Owner)));
        assert!(owner_kb.contains(&BTN_ADMIN_PANEL.to_string()));
    }

    #[test]
    fn test_settings_menu_toggle_shows_the_action() {
        let enabled = TtsSettings {
            enabled: true,
            voice: TtsVoice::Female,
        };
        assert!(labels(&settings_menu(&enabled)).contains(&BTN_TTS_DISABLE.to_string()));

        let disabled = TtsSettings {
            enabled: false,
            voice: TtsVoice::Female,
        };
        assert!(labels(&settings_menu(&disabled)).contains(&BTN_TTS_ENABLE.to_string()));
    }

    #[test]
    fn test_admin_menu_gates_admin_management_to_owner() {
        assert!(!labels(&admin_menu(Role::Admin)).contains(&BTN_MANAGE_ADMINS.to_string()));
        assert!(labels(&admin_menu(Role::Owner)).contains(&BTN_MANAGE_ADMINS.to_string()));
    }

    #[test]
    fn test_model_selection_marks_current_and_carries_full_name() {
        let models = vec![
            "models/gemini-2.5-flash".to_string(),
            "models/gemini-2.5-pro".to_string(),
        ];
        let kb = model_selection(&models, "models/gemini-2.5-pro");
        let buttons: Vec<&InlineKeyboardButton> = kb.inline_keyboard.iter().flatten().collect();

        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[0].text, "gemini-2.5-flash");
        assert_eq!(buttons[1].text, "✅ gemini-2.5-pro");

        match &buttons[1].kind {
            InlineKeyboardButtonKind::CallbackData(data) => {
                assert_eq!(data, "set_model:models/gemini-2.5-pro");
            }
            other => panic!("unexpected button kind: {other:?}"),
        }
    }
}
