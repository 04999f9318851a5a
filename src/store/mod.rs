//! Dual-tier record store.
//!
//! Collections are serialized JSON values addressed by key. Two tiers back
//! them: the always-available local tier ([`local::LocalTier`], SQLite) and
//! an optional remote tier ([`remote::RemoteTier`], HTTP). Both backends
//! satisfy the same [`RecordStore`] contract so everything above the store is
//! backend-agnostic:
//!
//! - [`LocalOnlyStore`] — local tier only; chosen when no remote is
//!   configured or the startup probe fails.
//! - [`SyncedStore`] — write-through local-first, read-prefer-remote with
//!   silent fallback. Remote failures are logged and recovered, never
//!   surfaced as errors.

pub mod local;
pub mod remote;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use local::LocalTier;
use remote::{RemoteError, RemoteTier};

/// Key used for the startup write-then-remove capability probe.
const PROBE_KEY: &str = "__sync_probe__";

/// How long a collaborator should display a [`SyncNotice`] before
/// auto-dismissing it.
pub const NOTICE_DISMISS_DELAY: Duration = Duration::from_secs(2);

/// The read/write contract shared by both backends.
///
/// `write` succeeds iff the local tier accepted the value; remote sync is
/// best-effort and eventually consistent. A read immediately following a
/// write therefore always observes the written value.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read the serialized value stored under `key`, if any.
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Durably write `value` under `key`.
    async fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Why the remote tier was taken out of service for this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    WriteQuota,
    StorageQuota,
    PermissionDenied,
    Other,
}

/// One-time advisory surfaced when the startup probe fails. The collaborator
/// displays it transiently (see [`NOTICE_DISMISS_DELAY`]); it never blocks
/// any operation.
#[derive(Debug, Clone)]
pub struct SyncNotice {
    pub kind: NoticeKind,
    pub message: String,
}

impl SyncNotice {
    fn from_remote_error(err: &RemoteError) -> Self {
        let kind = match err {
            RemoteError::WriteQuotaExceeded => NoticeKind::WriteQuota,
            RemoteError::StorageQuotaExceeded | RemoteError::PayloadTooLarge { .. } => {
                NoticeKind::StorageQuota
            }
            RemoteError::PermissionDenied => NoticeKind::PermissionDenied,
            RemoteError::Unavailable(_) => NoticeKind::Other,
        };
        Self {
            kind,
            message: format!("sync disabled for this session: {err}"),
        }
    }
}

/// Local tier only. Always available, always durable.
pub struct LocalOnlyStore {
    local: Arc<LocalTier>,
}

impl LocalOnlyStore {
    pub fn new(local: Arc<LocalTier>) -> Self {
        Self { local }
    }
}

#[async_trait]
impl RecordStore for LocalOnlyStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        self.local.read(key)
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        self.local.write(key, value)
    }
}

/// Local tier plus a probed-writable remote tier.
pub struct SyncedStore {
    local: Arc<LocalTier>,
    remote: Box<dyn RemoteTier>,
}

impl SyncedStore {
    pub fn new(local: Arc<LocalTier>, remote: Box<dyn RemoteTier>) -> Self {
        Self { local, remote }
    }
}

#[async_trait]
impl RecordStore for SyncedStore {
    /// Prefer the remote value when the remote answers; fall back to the
    /// local tier when it errors or holds nothing.
    async fn read(&self, key: &str) -> Result<Option<String>> {
        match self.remote.read(key).await {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) => self.local.read(key),
            Err(err) => {
                tracing::warn!(key, %err, "remote read failed, serving local copy");
                self.local.read(key)
            }
        }
    }

    /// Local first, so the write is durable even if the remote attempt
    /// fails; then best-effort remote.
    async fn write(&self, key: &str, value: &str) -> Result<()> {
        self.local.write(key, value)?;

        if let Err(err) = self.remote.write(key, value).await {
            tracing::warn!(key, %err, "remote write failed, local copy is current");
        }
        Ok(())
    }
}

/// Select and reconcile a backend at startup.
///
/// With no remote configured this is just a [`LocalOnlyStore`]. Otherwise
/// the remote is probed for actual writability (a canary write-then-remove;
/// merely responding is not enough). On probe failure the error is
/// classified into a [`SyncNotice`] and the session runs local-only. On
/// success, for each managed key: a local value missing from the remote is
/// copied up exactly once (seed), then every remote value is copied down
/// over the local copy — last writer wins, with the remote as source of
/// truth once data exists there.
pub async fn open_store(
    local: Arc<LocalTier>,
    remote: Option<Box<dyn RemoteTier>>,
    managed_keys: &[&str],
) -> Result<(Arc<dyn RecordStore>, Option<SyncNotice>)> {
    let Some(remote) = remote else {
        return Ok((Arc::new(LocalOnlyStore::new(local)), None));
    };

    if let Err(err) = probe_remote(remote.as_ref()).await {
        tracing::warn!(%err, "remote probe failed, running local-only");
        let notice = SyncNotice::from_remote_error(&err);
        return Ok((Arc::new(LocalOnlyStore::new(local)), Some(notice)));
    }

    reconcile(&local, remote.as_ref(), managed_keys).await?;

    Ok((Arc::new(SyncedStore::new(local, remote)), None))
}

/// Canary write-then-remove. Proves the remote accepts writes, not merely
/// that it answers reads.
async fn probe_remote(remote: &dyn RemoteTier) -> Result<(), RemoteError> {
    let stamp = chrono::Utc::now().to_rfc3339();
    remote.write(PROBE_KEY, &stamp).await?;
    remote.remove(PROBE_KEY).await?;
    tracing::debug!("remote probe succeeded");
    Ok(())
}

/// One-way seed up, then pull down (remote wins).
async fn reconcile(
    local: &LocalTier,
    remote: &dyn RemoteTier,
    managed_keys: &[&str],
) -> Result<()> {
    for key in managed_keys {
        match remote.read(key).await {
            Ok(Some(value)) => {
                local.write(key, &value)?;
                tracing::debug!(key, "pulled remote value into local tier");
            }
            Ok(None) => {
                if let Some(value) = local.read(key)? {
                    match remote.write(key, &value).await {
                        Ok(()) => tracing::info!(key, "seeded remote tier from local copy"),
                        Err(err) => {
                            tracing::warn!(key, %err, "failed to seed remote tier");
                        }
                    }
                }
            }
            Err(err) => {
                tracing::warn!(key, %err, "remote read failed during reconciliation");
            }
        }
    }
    Ok(())
}
