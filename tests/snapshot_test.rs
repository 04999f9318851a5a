mod helpers;

use helpers::{create_word, seeded_scheduler, test_fixture};

use drillbook::vocab::scheduler::PracticeSettings;
use drillbook::vocab::snapshot::{self, Snapshot};
use drillbook::vocab::types::{ItemKind, COLLECTION_VERSION};

/// Build a fixture with some practice history behind it.
async fn drilled_fixture() -> (
    drillbook::vocab::repository::ItemRepository,
    drillbook::vocab::practice_log::PracticeLog,
) {
    let (repo, log) = test_fixture();
    create_word(&repo, "alpha").await;
    create_word(&repo, "beta").await;

    let mut scheduler = seeded_scheduler(
        repo.clone(),
        log.clone(),
        PracticeSettings::default(),
        ItemKind::Word,
    );
    for _ in 0..3 {
        let drill = scheduler.select_next().await.unwrap();
        scheduler
            .submit_answer(&drill.item.primary_text)
            .await
            .unwrap();
    }
    (repo, log)
}

#[tokio::test]
async fn export_import_round_trip_is_field_for_field() {
    let (repo, log) = drilled_fixture().await;

    let exported = snapshot::take(&repo, &log).await.unwrap();
    assert_eq!(exported.version, COLLECTION_VERSION);

    // Serialize and parse back, as a real export/import does
    let json = serde_json::to_string_pretty(&exported).unwrap();
    let parsed: Snapshot = serde_json::from_str(&json).unwrap();

    // Restore into a brand-new store
    let (fresh_repo, fresh_log) = test_fixture();
    snapshot::restore(&fresh_repo, &fresh_log, parsed).await.unwrap();

    assert_eq!(fresh_repo.all().await.unwrap(), exported.items);
    assert_eq!(fresh_log.days().await.unwrap(), exported.practice_log);
}

#[tokio::test]
async fn import_overwrites_existing_collections_wholesale() {
    let (repo, log) = drilled_fixture().await;
    let snapshot = snapshot::take(&repo, &log).await.unwrap();

    let (target_repo, target_log) = test_fixture();
    create_word(&target_repo, "doomed").await;
    target_log.record("doomed-id", true).await.unwrap();

    snapshot::restore(&target_repo, &target_log, snapshot.clone())
        .await
        .unwrap();

    let items = target_repo.all().await.unwrap();
    assert_eq!(items, snapshot.items);
    assert!(items.iter().all(|i| i.primary_text != "doomed"));
    assert_eq!(target_log.days().await.unwrap(), snapshot.practice_log);
}

#[tokio::test]
async fn empty_snapshot_round_trips() {
    let (repo, log) = test_fixture();
    let snapshot = snapshot::take(&repo, &log).await.unwrap();
    assert!(snapshot.items.is_empty());
    assert!(snapshot.practice_log.is_empty());

    let (fresh_repo, fresh_log) = test_fixture();
    snapshot::restore(&fresh_repo, &fresh_log, snapshot).await.unwrap();
    assert!(fresh_repo.all().await.unwrap().is_empty());
    assert!(fresh_log.days().await.unwrap().is_empty());
}
