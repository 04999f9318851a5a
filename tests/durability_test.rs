mod helpers;

use std::collections::BTreeSet;
use std::sync::Arc;

use drillbook::store::local::LocalTier;
use drillbook::store::LocalOnlyStore;
use drillbook::vocab::repository::ItemRepository;
use drillbook::vocab::types::ItemKind;

fn repo_at(path: &std::path::Path) -> ItemRepository {
    let local = Arc::new(LocalTier::open(path).unwrap());
    ItemRepository::new(Arc::new(LocalOnlyStore::new(local)))
}

#[tokio::test]
async fn collections_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("vocab.db");

    let created = {
        let repo = repo_at(&db_path);
        repo.create(
            ItemKind::Word,
            "persist",
            vec!["持久".into()],
            BTreeSet::new(),
        )
        .await
        .unwrap()
    };

    // A fresh process opening the same file sees the record unchanged
    let repo = repo_at(&db_path);
    let reloaded = repo.get_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(reloaded, created);
}

#[tokio::test]
async fn open_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("deep/nested/vocab.db");

    let repo = repo_at(&nested);
    repo.create(ItemKind::Word, "ok", vec!["好".into()], BTreeSet::new())
        .await
        .unwrap();
    assert!(nested.exists());
}
