//! Full-collection snapshots for export and import.
//!
//! A snapshot carries every item and the whole practice log. Import
//! overwrites both collections wholesale — the caller is responsible for
//! confirming with the user first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::vocab::practice_log::PracticeLog;
use crate::vocab::repository::ItemRepository;
use crate::vocab::types::{Item, PracticeDays, COLLECTION_VERSION};

/// Exported payload — items plus practice log, stamped and versioned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub items: Vec<Item>,
    #[serde(default)]
    pub practice_log: PracticeDays,
}

/// Capture the current collections into a snapshot.
pub async fn take(repo: &ItemRepository, log: &PracticeLog) -> Result<Snapshot> {
    Ok(Snapshot {
        version: COLLECTION_VERSION,
        exported_at: Utc::now(),
        items: repo.all().await?,
        practice_log: log.days().await?,
    })
}

/// Replace both collections with the snapshot's contents.
pub async fn restore(repo: &ItemRepository, log: &PracticeLog, snapshot: Snapshot) -> Result<()> {
    let items = snapshot.items.len();
    let days = snapshot.practice_log.len();

    repo.replace_all(snapshot.items).await?;
    log.replace_all(snapshot.practice_log).await?;

    tracing::info!(items, days, "restored snapshot");
    Ok(())
}
