//! Core domain types: users, roles, TTS preferences, chat roles.

use serde::{Deserialize, Serialize};

/// Telegram user identity as delivered by the front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgUser {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Privilege level of a user. Ordering matters: `User < Admin < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
    Owner,
}

impl Role {
    /// Database representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }

    /// Parses the database representation. Unknown values map to `User`.
    pub fn parse(s: &str) -> Role {
        match s {
            "owner" => Role::Owner,
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

/// Capability check used at the top of privileged handlers.
pub fn has_role(role: Role, required: Role) -> bool {
    role >= required
}

/// TTS voice preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TtsVoice {
    Male,
    Female,
}

impl TtsVoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            TtsVoice::Male => "male",
            TtsVoice::Female => "female",
        }
    }

    pub fn parse(s: &str) -> TtsVoice {
        match s {
            "male" => TtsVoice::Male,
            _ => TtsVoice::Female,
        }
    }
}

/// Per-user TTS preferences; defaults to enabled with the female voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtsSettings {
    pub enabled: bool,
    pub voice: TtsVoice,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            voice: TtsVoice::Female,
        }
    }
}

/// Author of a chat-history message: the user or the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }

    pub fn parse(s: &str) -> ChatRole {
        match s {
            "model" => ChatRole::Model,
            _ => ChatRole::User,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering() {
        assert!(Role::User < Role::Admin);
        assert!(Role::Admin < Role::Owner);
    }

    #[test]
    fn test_has_role() {
        assert!(has_role(Role::Owner, Role::Admin));
        assert!(has_role(Role::Admin, Role::Admin));
        assert!(!has_role(Role::User, Role::Admin));
        assert!(!has_role(Role::Admin, Role::Owner));
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::User, Role::Admin, Role::Owner] {
            assert_eq!(Role::parse(role.as_str()), role);
        }
    }

    #[test]
    fn test_role_parse_unknown_defaults_to_user() {
        assert_eq!(Role::parse("moderator"), Role::User);
        assert_eq!(Role::parse(""), Role::User);
    }

    #[test]
    fn test_tts_defaults() {
        let settings = TtsSettings::default();
        assert!(settings.enabled);
        assert_eq!(settings.voice, TtsVoice::Female);
    }

    #[test]
    fn test_chat_role_round_trip() {
        assert_eq!(ChatRole::parse("user"), ChatRole::User);
        assert_eq!(ChatRole::parse("model"), ChatRole::Model);
    }
}
