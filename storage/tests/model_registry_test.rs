//! Integration tests for ModelRegistry sync and listing.

use std::sync::Arc;

use storage::{BotCache, ManualClock, ModelRegistry, SqlitePoolManager};

async fn setup() -> (Arc<BotCache>, SqlitePoolManager, ModelRegistry) {
    let pool = SqlitePoolManager::new("sqlite::memory:")
        .await
        .expect("Failed to create pool");
    pool.init_schema().await.expect("Failed to init schema");

    let cache = Arc::new(BotCache::new(Arc::new(ManualClock::new())));
    let registry = ModelRegistry::new(pool.clone(), cache.clone());
    (cache, pool, registry)
}

async fn row_ids(pool: &SqlitePoolManager) -> Vec<i64> {
    let rows: Vec<(i64,)> = sqlx::query_as("SELECT id FROM ai_models ORDER BY id ASC")
        .fetch_all(pool.pool())
        .await
        .expect("query ids");
    rows.into_iter().map(|(id,)| id).collect()
}

#[tokio::test]
async fn test_sync_populates_empty_table() {
    let (_cache, _pool, registry) = setup().await;

    let changed = registry
        .sync(&[
            "models/gemini-2.5-pro".to_string(),
            "models/gemini-2.5-flash".to_string(),
            "models/gemini-2.5-flash-lite".to_string(),
        ])
        .await
        .expect("sync");
    assert!(changed);

    // Listed in priority order regardless of insertion order.
    let models = registry.list_active().await.expect("list");
    assert_eq!(
        models,
        vec![
            "models/gemini-2.5-flash-lite",
            "models/gemini-2.5-flash",
            "models/gemini-2.5-pro",
        ]
    );
}

#[tokio::test]
async fn test_sync_is_idempotent_for_identical_listing() {
    let (_cache, pool, registry) = setup().await;

    let models = vec![
        "models/gemini-2.5-flash".to_string(),
        "models/gemini-2.5-pro".to_string(),
    ];
    assert!(registry.sync(&models).await.expect("first sync"));
    let ids_before = row_ids(&pool).await;

    // Same set again, in a different order: no rewrite, row ids untouched.
    let reordered = vec![
        "models/gemini-2.5-pro".to_string(),
        "models/gemini-2.5-flash".to_string(),
    ];
    assert!(!registry.sync(&reordered).await.expect("second sync"));
    assert_eq!(row_ids(&pool).await, ids_before);
}

#[tokio::test]
async fn test_sync_rewrites_on_changed_listing() {
    let (_cache, pool, registry) = setup().await;

    registry
        .sync(&["models/gemini-2.5-flash".to_string()])
        .await
        .expect("first sync");
    let ids_before = row_ids(&pool).await;

    let changed = registry
        .sync(&[
            "models/gemini-2.5-flash".to_string(),
            "models/gemini-2.5-pro".to_string(),
        ])
        .await
        .expect("second sync");
    assert!(changed);

    // Full replace: the surviving name gets a fresh row too.
    let ids_after = row_ids(&pool).await;
    assert_eq!(ids_after.len(), 2);
    assert!(ids_before.iter().all(|id| !ids_after.contains(id)));
}

#[tokio::test]
async fn test_sync_invalidates_model_list_cache() {
    let (cache, _pool, registry) = setup().await;

    registry
        .sync(&["models/gemini-2.5-flash".to_string()])
        .await
        .expect("first sync");
    // Populate the cache slot.
    assert_eq!(registry.list_active().await.expect("list").len(), 1);
    assert!(cache.models.get().is_some());

    registry
        .sync(&[
            "models/gemini-2.5-flash".to_string(),
            "models/gemini-2.5-pro".to_string(),
        ])
        .await
        .expect("second sync");
    assert!(cache.models.get().is_none());
    assert_eq!(registry.list_active().await.expect("list").len(), 2);
}

#[tokio::test]
async fn test_inactive_models_are_hidden_but_kept() {
    let (_cache, pool, registry) = setup().await;

    registry
        .sync(&[
            "models/gemini-2.5-flash".to_string(),
            "models/gemini-2.5-pro".to_string(),
        ])
        .await
        .expect("sync");

    registry
        .set_active("models/gemini-2.5-pro", false)
        .await
        .expect("set_active");

    let models = registry.list_active().await.expect("list");
    assert_eq!(models, vec!["models/gemini-2.5-flash"]);

    // Row is still there, only hidden.
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ai_models")
        .fetch_one(pool.pool())
        .await
        .expect("count");
    assert_eq!(count.0, 2);
}
