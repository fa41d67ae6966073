//! User-facing message text, button labels and outbound chunking.

/// Telegram's hard limit on message length, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

// Button labels. The reply keyboards echo these back as plain text, so the
// handler matches on them verbatim.
pub const BTN_SETTINGS: &str = "⚙️ Settings";
pub const BTN_ADMIN_PANEL: &str = "🛠 Admin panel";
pub const BTN_BACK: &str = "⬅️ Back";
pub const BTN_CLEAR_CONTEXT: &str = "🧹 Clear context";
pub const BTN_TTS_ENABLE: &str = "🔊 Enable voice replies";
pub const BTN_TTS_DISABLE: &str = "🔇 Disable voice replies";
pub const BTN_VOICE_MALE: &str = "🗣 Voice: male";
pub const BTN_VOICE_FEMALE: &str = "🗣 Voice: female";
pub const BTN_CHANGE_MODEL: &str = "🤖 Change model";
pub const BTN_MANAGE_ADMINS: &str = "👥 Manage admins";
pub const BTN_ADD_ADMIN: &str = "➕ Add admin";
pub const BTN_REMOVE_ADMIN: &str = "➖ Remove admin";
pub const BTN_LIST_ADMINS: &str = "📋 List admins";

pub const WELCOME: &str =
    "Hi! I'm a Gemini-backed assistant. Send me any message and I'll answer. \
     Use the keyboard below for settings.";
pub const TEXT_ONLY: &str = "I can only work with text messages for now.";
pub const CANCELLED: &str = "Cancelled.";
pub const CONTEXT_CLEARED: &str = "Conversation context cleared.";
pub const NOT_ALLOWED: &str = "This action is available to admins only.";
pub const OWNER_ONLY: &str = "Only the owner can manage admins.";
pub const ASK_ADMIN_ID_TO_ADD: &str =
    "Send the numeric Telegram id of the user to promote, or /cancel.";
pub const ASK_ADMIN_ID_TO_REMOVE: &str =
    "Send the numeric Telegram id of the admin to demote, or /cancel.";
pub const NOT_A_USER_ID: &str = "That doesn't look like a numeric user id. Try again or /cancel.";

pub fn no_models_configured(contact: &str) -> String {
    format!("No models are configured yet. Please contact {contact}.")
}

pub fn model_not_found_reply(contact: &str) -> String {
    format!(
        "The selected model is no longer available; I've refreshed the model list. \
         Please try again, or contact {contact} if this keeps happening."
    )
}

pub fn generic_failure(contact: &str) -> String {
    format!(
        "Sorry, I couldn't get an answer right now. Please try again in a minute \
         or contact {contact}."
    )
}

/// Splits `text` into Telegram-sized chunks.
///
/// Each cut prefers the last newline inside the window, then the last
/// space, then a hard cut. Continuation chunks are stripped of the leading
/// whitespace the cut left behind.
pub fn split_message(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;

    loop {
        // Byte offset of the character right after the window, if the rest
        // overflows it.
        let window_end = match rest.char_indices().nth(MAX_MESSAGE_LENGTH) {
            Some((offset, _)) => offset,
            None => break,
        };
        let window = &rest[..window_end];

        let cut = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .filter(|&i| i > 0)
            .unwrap_or(window_end);

        let (head, tail) = rest.split_at(cut);
        // An all-whitespace window trims down to nothing; Telegram rejects
        // empty messages, so such chunks are dropped.
        let head = head.trim_end();
        if !head.is_empty() {
            chunks.push(head.to_string());
        }
        rest = tail.trim_start_matches(['\n', ' ']);
    }

    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}
