mod helpers;

use helpers::memory_store;

use drillbook::vocab::practice_log::{PracticeLog, PRACTICE_LOG_KEY};
use drillbook::vocab::repository::{ItemRepository, ITEMS_KEY};
use drillbook::vocab::types::{ItemKind, ItemStats};

/// An item collection as an early version persisted it: a bare array whose
/// records have no `kind`, `tags`, or `stats`.
const LEGACY_ITEMS: &str = r#"[
    {
        "id": "legacy-1",
        "primary_text": "hello",
        "translations": ["你好"],
        "proficiency": -97,
        "added_at": "2025-11-02T08:30:00Z"
    },
    {
        "id": "legacy-2",
        "primary_text": "world",
        "translations": ["世界"],
        "proficiency": -100,
        "added_at": "2025-11-03T09:00:00Z"
    }
]"#;

#[tokio::test]
async fn legacy_items_are_backfilled_and_repersisted() {
    let (local, store) = memory_store();
    local.write(ITEMS_KEY, LEGACY_ITEMS).unwrap();

    let repo = ItemRepository::new(store);
    let items = repo.all().await.unwrap();

    assert_eq!(items.len(), 2);
    for item in &items {
        assert_eq!(item.kind, ItemKind::Word);
        assert!(item.tags.is_empty());
        assert_eq!(item.stats, ItemStats::default());
    }

    // The healed collection was written back in the current envelope
    let stored = local.read(ITEMS_KEY).unwrap().unwrap();
    assert!(stored.contains("\"version\":2"));
    assert!(stored.contains("\"stats\""));
}

#[tokio::test]
async fn healing_is_idempotent() {
    let (local, store) = memory_store();
    local.write(ITEMS_KEY, LEGACY_ITEMS).unwrap();

    let repo = ItemRepository::new(store);
    let first = repo.all().await.unwrap();
    let after_first = local.read(ITEMS_KEY).unwrap().unwrap();

    let second = repo.all().await.unwrap();
    let after_second = local.read(ITEMS_KEY).unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn legacy_practice_log_is_migrated() {
    let (local, store) = memory_store();
    local
        .write(
            PRACTICE_LOG_KEY,
            r#"{"2025-11-02":{"item_ids":["a","a","b"],"correct_count":4}}"#,
        )
        .unwrap();

    let log = PracticeLog::new(store);
    let days = log.days().await.unwrap();

    let day = &days["2025-11-02"];
    assert_eq!(day.item_ids.len(), 2);
    assert_eq!(day.correct_count, 4);

    let stored = local.read(PRACTICE_LOG_KEY).unwrap().unwrap();
    assert!(stored.contains("\"version\":2"));
}

#[tokio::test]
async fn migrated_records_stay_usable() {
    let (local, store) = memory_store();
    local.write(ITEMS_KEY, LEGACY_ITEMS).unwrap();

    let repo = ItemRepository::new(store);
    let migrated = repo.get_by_id("legacy-1").await.unwrap().unwrap();
    assert_eq!(migrated.primary_text, "hello");

    // Queries and mutations work on healed records
    let lowest = repo.lowest_by_proficiency(1).await.unwrap();
    assert_eq!(lowest[0].id, "legacy-2");
    assert!(repo.delete("legacy-2").await.unwrap());
    assert_eq!(repo.all().await.unwrap().len(), 1);
}
