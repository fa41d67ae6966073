//! Integration tests for UserStore: roles, admin management, TTS preferences.

use std::sync::Arc;

use bot_core::{Role, TgUser, TtsVoice};
use storage::{BotCache, ManualClock, SqlitePoolManager, UserStore};

const OWNER_ID: i64 = 100;

fn tg_user(id: i64) -> TgUser {
    TgUser {
        id,
        username: Some(format!("user{id}")),
        first_name: Some("Test".to_string()),
        last_name: None,
    }
}

async fn setup() -> (Arc<BotCache>, UserStore) {
    let pool = SqlitePoolManager::new("sqlite::memory:")
        .await
        .expect("Failed to create pool");
    pool.init_schema().await.expect("Failed to init schema");

    let cache = Arc::new(BotCache::new(Arc::new(ManualClock::new())));
    let store = UserStore::new(pool, cache.clone(), OWNER_ID);
    (cache, store)
}

#[tokio::test]
async fn test_register_assigns_owner_role_only_to_owner_id() {
    let (_cache, store) = setup().await;

    store
        .register_if_not_exists(&tg_user(OWNER_ID))
        .await
        .expect("register owner");
    store
        .register_if_not_exists(&tg_user(200))
        .await
        .expect("register user");

    assert_eq!(store.role_of(OWNER_ID).await.expect("role"), Some(Role::Owner));
    assert_eq!(store.role_of(200).await.expect("role"), Some(Role::User));
}

#[tokio::test]
async fn test_register_is_idempotent() {
    let (_cache, store) = setup().await;

    store
        .register_if_not_exists(&tg_user(200))
        .await
        .expect("first register");
    store.update_role(200, Role::Admin).await.expect("promote");
    store
        .register_if_not_exists(&tg_user(200))
        .await
        .expect("second register");

    // A re-register must not reset the role.
    assert_eq!(store.role_of(200).await.expect("role"), Some(Role::Admin));
}

#[tokio::test]
async fn test_owner_role_restored_on_next_contact() {
    let (_cache, store) = setup().await;

    store
        .register_if_not_exists(&tg_user(OWNER_ID))
        .await
        .expect("register owner");
    store
        .update_role(OWNER_ID, Role::User)
        .await
        .expect("demote owner");

    store
        .register_if_not_exists(&tg_user(OWNER_ID))
        .await
        .expect("owner returns");
    assert_eq!(store.role_of(OWNER_ID).await.expect("role"), Some(Role::Owner));
}

#[tokio::test]
async fn test_role_of_unknown_user_is_none() {
    let (_cache, store) = setup().await;
    assert_eq!(store.role_of(999).await.expect("role"), None);
}

#[tokio::test]
async fn test_is_admin_accepts_admin_and_owner() {
    let (_cache, store) = setup().await;

    store
        .register_if_not_exists(&tg_user(OWNER_ID))
        .await
        .expect("register owner");
    store
        .register_if_not_exists(&tg_user(200))
        .await
        .expect("register user");
    store
        .register_if_not_exists(&tg_user(300))
        .await
        .expect("register admin");
    store.update_role(300, Role::Admin).await.expect("promote");

    assert!(store.is_admin(OWNER_ID).await.expect("owner"));
    assert!(store.is_admin(300).await.expect("admin"));
    assert!(!store.is_admin(200).await.expect("user"));
    assert!(!store.is_admin(999).await.expect("unknown"));
}

#[tokio::test]
async fn test_add_admin_rules() {
    let (_cache, store) = setup().await;

    store
        .register_if_not_exists(&tg_user(OWNER_ID))
        .await
        .expect("register owner");
    store
        .register_if_not_exists(&tg_user(200))
        .await
        .expect("register user");

    assert!(store.add_admin(200).await.expect("promote"));
    assert_eq!(store.role_of(200).await.expect("role"), Some(Role::Admin));

    // Already an admin.
    assert!(!store.add_admin(200).await.expect("repromote"));
    // Owner cannot be touched.
    assert!(!store.add_admin(OWNER_ID).await.expect("promote owner"));
    // Unknown user.
    assert!(!store.add_admin(999).await.expect("promote unknown"));
}

#[tokio::test]
async fn test_remove_admin_rules() {
    let (_cache, store) = setup().await;

    store
        .register_if_not_exists(&tg_user(OWNER_ID))
        .await
        .expect("register owner");
    store
        .register_if_not_exists(&tg_user(200))
        .await
        .expect("register user");
    store.add_admin(200).await.expect("promote");

    assert!(store.remove_admin(200).await.expect("demote"));
    assert_eq!(store.role_of(200).await.expect("role"), Some(Role::User));

    // No longer an admin.
    assert!(!store.remove_admin(200).await.expect("redemote"));
    // Owner cannot be demoted through admin management.
    assert!(!store.remove_admin(OWNER_ID).await.expect("demote owner"));
}

#[tokio::test]
async fn test_list_admins_includes_owner_and_admins() {
    let (_cache, store) = setup().await;

    store
        .register_if_not_exists(&tg_user(OWNER_ID))
        .await
        .expect("register owner");
    store
        .register_if_not_exists(&tg_user(200))
        .await
        .expect("register user");
    store
        .register_if_not_exists(&tg_user(50))
        .await
        .expect("register admin");
    store.add_admin(50).await.expect("promote");

    let admins = store.list_admins().await.expect("list");
    let ids: Vec<i64> = admins.iter().map(|a| a.user_id).collect();
    assert_eq!(ids, vec![50, OWNER_ID]);
    assert_eq!(admins[0].role, Role::Admin);
    assert_eq!(admins[1].role, Role::Owner);
}

#[tokio::test]
async fn test_tts_defaults_for_unknown_user() {
    let (_cache, store) = setup().await;

    let settings = store.tts_settings(999).await.expect("tts");
    assert!(settings.enabled);
    assert_eq!(settings.voice, TtsVoice::Female);
}

#[tokio::test]
async fn test_tts_writes_invalidate_only_the_tts_entry() {
    let (cache, store) = setup().await;

    store
        .register_if_not_exists(&tg_user(200))
        .await
        .expect("register");
    // Populate both per-user cache fields.
    store.role_of(200).await.expect("role");
    store.tts_settings(200).await.expect("tts");
    assert!(cache.roles.get(&200).is_some());
    assert!(cache.tts.get(&200).is_some());

    store.set_tts_enabled(200, false).await.expect("disable");
    assert!(cache.tts.get(&200).is_none());
    assert!(cache.roles.get(&200).is_some());

    let settings = store.tts_settings(200).await.expect("tts");
    assert!(!settings.enabled);
}

#[tokio::test]
async fn test_set_tts_voice_round_trip() {
    let (_cache, store) = setup().await;

    store
        .register_if_not_exists(&tg_user(200))
        .await
        .expect("register");
    store
        .set_tts_voice(200, TtsVoice::Male)
        .await
        .expect("set voice");

    let settings = store.tts_settings(200).await.expect("tts");
    assert_eq!(settings.voice, TtsVoice::Male);
}

#[tokio::test]
async fn test_role_write_invalidates_only_the_role_entry() {
    let (cache, store) = setup().await;

    store
        .register_if_not_exists(&tg_user(200))
        .await
        .expect("register");
    store.role_of(200).await.expect("role");
    store.tts_settings(200).await.expect("tts");

    store.update_role(200, Role::Admin).await.expect("promote");
    assert!(cache.roles.get(&200).is_none());
    assert!(cache.tts.get(&200).is_some());
}

#[tokio::test]
async fn test_user_ids_lists_everyone() {
    let (_cache, store) = setup().await;

    store
        .register_if_not_exists(&tg_user(OWNER_ID))
        .await
        .expect("register owner");
    store
        .register_if_not_exists(&tg_user(200))
        .await
        .expect("register user");

    let mut ids = store.user_ids().await.expect("ids");
    ids.sort();
    assert_eq!(ids, vec![OWNER_ID, 200]);
}
