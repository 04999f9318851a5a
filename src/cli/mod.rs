pub mod add;
pub mod doctor;
pub mod export;
pub mod import;
pub mod practice;
pub mod reset;
pub mod stats;

use anyhow::Result;
use std::sync::Arc;

use drillbook::config::DrillbookConfig;
use drillbook::store::local::LocalTier;
use drillbook::store::remote::{HttpRemote, RemoteTier};
use drillbook::store::{open_store, SyncNotice};
use drillbook::vocab::practice_log::{PracticeLog, PRACTICE_LOG_KEY};
use drillbook::vocab::repository::{ItemRepository, ITEMS_KEY};

/// Everything a command needs: the repository and log over the backend the
/// startup probe selected.
pub struct Runtime {
    pub repo: ItemRepository,
    pub log: PracticeLog,
    pub notice: Option<SyncNotice>,
}

/// Open the local tier, probe the remote tier if configured, and reconcile.
/// A probe failure prints its one-time advisory and the session continues
/// local-only.
pub async fn open_runtime(config: &DrillbookConfig) -> Result<Runtime> {
    let local = Arc::new(LocalTier::open(config.resolved_db_path())?);

    let remote = config.sync.base_url.as_ref().map(|url| {
        Box::new(HttpRemote::new(url.clone(), config.sync.api_token.clone()))
            as Box<dyn RemoteTier>
    });

    let (store, notice) =
        open_store(local, remote, &[ITEMS_KEY, PRACTICE_LOG_KEY]).await?;

    if let Some(notice) = &notice {
        eprintln!("note: {}", notice.message);
    }

    Ok(Runtime {
        repo: ItemRepository::new(Arc::clone(&store)),
        log: PracticeLog::new(store),
        notice,
    })
}
