#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use drillbook::store::local::LocalTier;
use drillbook::store::remote::{RemoteError, RemoteTier};
use drillbook::store::{LocalOnlyStore, RecordStore};
use drillbook::vocab::practice_log::PracticeLog;
use drillbook::vocab::repository::ItemRepository;
use drillbook::vocab::scheduler::{PracticeSettings, Scheduler};
use drillbook::vocab::types::{Item, ItemKind, ItemStats};

/// Fresh in-memory local tier plus a local-only store over it. The tier is
/// returned too so tests can inspect raw stored payloads.
pub fn memory_store() -> (Arc<LocalTier>, Arc<dyn RecordStore>) {
    let local = Arc::new(LocalTier::open_in_memory().unwrap());
    let store: Arc<dyn RecordStore> = Arc::new(LocalOnlyStore::new(Arc::clone(&local)));
    (local, store)
}

/// Repository and practice log over a fresh in-memory local-only store.
pub fn test_fixture() -> (ItemRepository, PracticeLog) {
    let (_, store) = memory_store();
    (
        ItemRepository::new(Arc::clone(&store)),
        PracticeLog::new(store),
    )
}

/// Scheduler with a fixed seed for reproducible picks.
pub fn seeded_scheduler(
    repo: ItemRepository,
    log: PracticeLog,
    settings: PracticeSettings,
    kind: ItemKind,
) -> Scheduler {
    Scheduler::with_rng(repo, log, settings, kind, StdRng::seed_from_u64(42)).unwrap()
}

/// Hand-build an item record with explicit proficiency and creation time.
pub fn make_item(text: &str, proficiency: i64, added_at: DateTime<Utc>) -> Item {
    Item {
        id: uuid::Uuid::now_v7().to_string(),
        kind: ItemKind::Word,
        primary_text: text.to_string(),
        translations: vec![format!("{text}-gloss")],
        tags: BTreeSet::new(),
        proficiency,
        added_at,
        stats: ItemStats::default(),
    }
}

pub fn make_item_now(text: &str, proficiency: i64) -> Item {
    make_item(text, proficiency, Utc::now())
}

/// Create a word through the repository. Returns the stored record.
pub async fn create_word(repo: &ItemRepository, text: &str) -> Item {
    repo.create(
        ItemKind::Word,
        text,
        vec![format!("{text}-gloss")],
        BTreeSet::new(),
    )
    .await
    .unwrap()
}

/// Which calls the scripted remote should fail, always with the given error
/// kind.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FailMode {
    None,
    /// Every write fails — the startup probe cannot pass.
    AllWrites,
    /// Probe writes succeed, writes of real collection keys fail.
    DataWrites,
    /// Every read fails.
    Reads,
}

/// In-memory remote tier with scripted failures. Clones share state, so a
/// test can keep a handle for inspection after boxing one into the store.
#[derive(Clone)]
pub struct ScriptedRemote {
    values: Arc<Mutex<HashMap<String, String>>>,
    pub mode: FailMode,
    pub write_quota: bool,
}

impl ScriptedRemote {
    pub fn new(mode: FailMode) -> Self {
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
            mode,
            write_quota: true,
        }
    }

    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn error(&self) -> RemoteError {
        if self.write_quota {
            RemoteError::WriteQuotaExceeded
        } else {
            RemoteError::Unavailable("scripted outage".into())
        }
    }
}

#[async_trait]
impl RemoteTier for ScriptedRemote {
    async fn read(&self, key: &str) -> Result<Option<String>, RemoteError> {
        if self.mode == FailMode::Reads {
            return Err(RemoteError::Unavailable("scripted outage".into()));
        }
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), RemoteError> {
        let is_probe = key.starts_with("__");
        let fail = match self.mode {
            FailMode::AllWrites => true,
            FailMode::DataWrites => !is_probe,
            FailMode::None | FailMode::Reads => false,
        };
        if fail {
            return Err(self.error());
        }
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), RemoteError> {
        if self.mode == FailMode::AllWrites {
            return Err(self.error());
        }
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}
