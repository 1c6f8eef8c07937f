//! Where the collection is read from and written to.
//!
//! Reads prefer the remote, then the local cache, then the seed dataset. Writes
//! always go to the local cache first; the remote write is best effort and runs in
//! the background, tagged with a save sequence number so an older write can never
//! be mistaken for the latest one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use snafu::{ensure, ResultExt as _};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::instrument;

use super::monitor::LinkState;
use super::remote::Remote;
use crate::model::{seed, LocalRecord, ReplaceRequest, Timestamp, TrackedItem};

pub use cache::*;
pub use error::*;

mod cache;
mod error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadSource {
    Remote,
    Local,
    Seed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    pub source: LoadSource,
    pub items: Vec<TrackedItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    pub seq: u64,
    pub local_written: bool,
    pub remote_dispatched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReceipt {
    pub seq: u64,
    pub last_updated: Timestamp,
    /// A newer save reached the remote before this one did.
    pub stale: bool,
}

/// Outcome of the background half of a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    LocalSaveFailed { seq: u64, error: String },
    RemoteSaved { seq: u64, last_updated: Timestamp },
    RemoteFailed { seq: u64, error: String },
    /// Dropped before it could finish because save `by` was issued.
    RemoteSuperseded { seq: u64, by: u64 },
    /// Applied remotely after the newer save `latest` had already been applied.
    RemoteStale { seq: u64, latest: u64 },
}

#[derive(Debug, Default)]
struct Sequence {
    issued: AtomicU64,
    completed: AtomicU64,
}

impl Sequence {
    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn latest(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Mark `seq` as applied remotely. Fails with the newest applied sequence when
    /// that one is newer than `seq`.
    fn complete(&self, seq: u64) -> Result<(), u64> {
        let previous = self.completed.fetch_max(seq, Ordering::SeqCst);
        if previous > seq {
            Err(previous)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug)]
struct RemoteWrite {
    seq: u64,
    handle: JoinHandle<()>,
}

/// Announces a superseded write unless the write settled first. Lives inside the
/// write's future, so aborting the task announces it too.
struct Pending {
    seq: u64,
    sequence: Arc<Sequence>,
    events: broadcast::Sender<SyncEvent>,
    settled: bool,
}

impl Pending {
    fn settle(mut self, event: SyncEvent) {
        self.settled = true;
        let _ = self.events.send(event);
    }
}

impl Drop for Pending {
    fn drop(&mut self) {
        if !self.settled {
            let by = self.sequence.latest();
            tracing::debug!(seq = self.seq, by, "remote save superseded");
            let _ = self.events.send(SyncEvent::RemoteSuperseded { seq: self.seq, by });
        }
    }
}

pub struct Persistence {
    cache: LocalCache,
    remote: Arc<dyn Remote>,
    link: watch::Receiver<LinkState>,
    events: broadcast::Sender<SyncEvent>,
    sequence: Arc<Sequence>,
    in_flight: Mutex<Option<RemoteWrite>>,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("cache", &self.cache)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

impl Persistence {
    pub fn new(cache: LocalCache, remote: Arc<dyn Remote>, link: watch::Receiver<LinkState>) -> Self {
        let (events, _) = broadcast::channel(64);

        Self {
            cache,
            remote,
            link,
            events,
            sequence: Arc::default(),
            in_flight: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    fn link_state(&self) -> LinkState {
        *self.link.borrow()
    }

    /// Remote first when online, then the local cache, then the seed dataset.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Loaded {
        if self.link_state().is_online() {
            match self.remote.fetch().await {
                Ok(document) => {
                    tracing::info!(count = document.videos.len(), "loaded videos from the remote");
                    if let Err(err) = self.cache.write(&LocalRecord::new(document.videos.clone())) {
                        tracing::warn!(error = %err, "cannot mirror remote data into the local cache");
                    }

                    return Loaded {
                        source: LoadSource::Remote,
                        items: document.videos,
                    };
                }
                Err(err) => {
                    tracing::warn!(error = %err, "remote load failed, falling back to the local cache")
                }
            }
        }

        match self.cache.read() {
            Ok(Some(record)) => {
                tracing::info!(count = record.videos.len(), "loaded videos from the local cache");
                return Loaded {
                    source: LoadSource::Local,
                    items: record.videos,
                };
            }
            Ok(None) => tracing::info!("no local cache yet"),
            Err(err) => tracing::warn!(error = %err, "ignoring unreadable local cache"),
        }

        tracing::info!("starting from the seed dataset");
        Loaded {
            source: LoadSource::Seed,
            items: seed(),
        }
    }

    /// Write `items` to the local cache now and, when online, to the remote in the
    /// background. Failures are logged and published, never returned.
    #[instrument(skip_all, fields(count = items.len()))]
    pub fn save(&self, items: Vec<TrackedItem>) -> SaveReport {
        let seq = self.sequence.issue();

        let local_written = match self.cache.write(&LocalRecord::new(items.clone())) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(seq, error = %err, "local save failed");
                let _ = self.events.send(SyncEvent::LocalSaveFailed {
                    seq,
                    error: err.to_string(),
                });
                false
            }
        };

        let remote_dispatched = self.link_state().is_online();
        if remote_dispatched {
            self.dispatch(seq, items);
        } else {
            tracing::debug!(seq, "offline, saved locally only");
        }

        SaveReport {
            seq,
            local_written,
            remote_dispatched,
        }
    }

    /// Push `items` to the remote and wait for the answer.
    #[instrument(skip_all, fields(count = items.len()))]
    pub async fn sync(&self, items: Vec<TrackedItem>) -> Result<SyncReceipt, SyncError> {
        ensure!(self.link_state().is_online(), OfflineSnafu);

        let seq = self.sequence.issue();
        self.abort_in_flight();

        let response = self
            .remote
            .replace(ReplaceRequest::new(items))
            .await
            .context(RemoteSnafu)?;

        let stale = match self.sequence.complete(seq) {
            Ok(()) => false,
            Err(latest) => {
                tracing::warn!(seq, latest, "sync applied after a newer save");
                let _ = self.events.send(SyncEvent::RemoteStale { seq, latest });
                true
            }
        };

        tracing::info!(seq, "synced with the remote");
        Ok(SyncReceipt {
            seq,
            last_updated: response.last_updated,
            stale,
        })
    }

    fn abort_in_flight(&self) {
        let previous = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(previous) = previous {
            tracing::debug!(seq = previous.seq, "aborting remote save in flight");
            previous.handle.abort();
        }
    }

    fn dispatch(&self, seq: u64, items: Vec<TrackedItem>) {
        self.abort_in_flight();

        let remote = self.remote.clone();
        let pending = Pending {
            seq,
            sequence: self.sequence.clone(),
            events: self.events.clone(),
            settled: false,
        };

        let handle = tokio::spawn(async move {
            if pending.sequence.latest() > seq {
                return;
            }

            let event = match remote.replace(ReplaceRequest::new(items)).await {
                Ok(response) => match pending.sequence.complete(seq) {
                    Ok(()) => {
                        tracing::debug!(seq, "remote save done");
                        SyncEvent::RemoteSaved {
                            seq,
                            last_updated: response.last_updated,
                        }
                    }
                    Err(latest) => {
                        tracing::warn!(seq, latest, "remote save applied after a newer one");
                        SyncEvent::RemoteStale { seq, latest }
                    }
                },
                Err(err) => {
                    tracing::warn!(seq, error = %err, "remote save failed");
                    SyncEvent::RemoteFailed {
                        seq,
                        error: err.to_string(),
                    }
                }
            };

            pending.settle(event);
        });

        *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(RemoteWrite { seq, handle });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::model::{server_seed, ItemDraft};
    use crate::service::remote::MemoryRemote;

    struct Harness {
        _dir: tempfile::TempDir,
        remote: Arc<MemoryRemote>,
        link: watch::Sender<LinkState>,
        persistence: Persistence,
    }

    fn harness(state: LinkState) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(MemoryRemote::new(server_seed()));
        let (link, rx) = watch::channel(state);
        let persistence = Persistence::new(LocalCache::new(dir.path()), remote.clone(), rx);

        Harness {
            _dir: dir,
            remote,
            link,
            persistence,
        }
    }

    fn with_item(mut items: Vec<TrackedItem>, name: &str) -> Vec<TrackedItem> {
        let id = crate::query::next_id(&items);
        items.push(TrackedItem::from_draft(id, ItemDraft::named(name)));
        items
    }

    #[tokio::test]
    async fn online_load_adopts_the_remote_and_mirrors_it() {
        let h = harness(LinkState::Online);

        let loaded = h.persistence.load().await;

        assert_eq!(loaded.source, LoadSource::Remote);
        assert_eq!(loaded.items, server_seed());
        let cached = h.persistence.cache().read().unwrap().unwrap();
        assert_eq!(cached.videos, server_seed());
    }

    #[tokio::test]
    async fn foreign_dates_load_from_remote_and_cache_alike() {
        let dir = tempfile::tempdir().unwrap();
        let items: Vec<TrackedItem> = serde_json::from_value(serde_json::json!([
            { "id": 3, "name": "clean", "ytDate": "2025-02-01" },
            { "id": 7, "name": "hand typed", "igUpload": "Scheduled", "igDate": "05/01/2025" }
        ]))
        .unwrap();
        let remote = Arc::new(MemoryRemote::new(items.clone()));
        let (link, rx) = watch::channel(LinkState::Online);
        let persistence = Persistence::new(LocalCache::new(dir.path()), remote, rx);

        let loaded = persistence.load().await;
        assert_eq!(loaded.source, LoadSource::Remote);
        assert_eq!(loaded.items, items);

        link.send_replace(LinkState::Offline);
        let loaded = persistence.load().await;
        assert_eq!(loaded.source, LoadSource::Local);
        assert_eq!(loaded.items, items);
    }

    #[tokio::test]
    async fn failed_remote_load_falls_back_to_the_cache() {
        let h = harness(LinkState::Online);
        h.persistence.cache().write(&LocalRecord::new(Vec::new())).unwrap();
        h.remote.set_online(false);

        let loaded = h.persistence.load().await;

        assert_eq!(loaded.source, LoadSource::Local);
        assert!(loaded.items.is_empty(), "an empty cache is still real data");
    }

    #[tokio::test]
    async fn offline_without_cache_loads_the_seed() {
        let h = harness(LinkState::Offline);

        let loaded = h.persistence.load().await;

        assert_eq!(loaded.source, LoadSource::Seed);
        assert_eq!(loaded.items, seed());
    }

    #[tokio::test]
    async fn corrupted_cache_loads_the_seed() {
        let h = harness(LinkState::Offline);
        std::fs::write(h.persistence.cache().path(), "not json").unwrap();

        assert_eq!(h.persistence.load().await.source, LoadSource::Seed);
    }

    #[tokio::test]
    async fn offline_save_stays_local_then_sync_reaches_the_remote() {
        let h = harness(LinkState::Offline);
        let items = with_item(h.persistence.load().await.items, "Test");
        assert_eq!(items.last().unwrap().id, 9);

        let report = h.persistence.save(items.clone());

        assert!(report.local_written);
        assert!(!report.remote_dispatched);
        assert_eq!(h.persistence.cache().read().unwrap().unwrap().videos, items);
        assert_eq!(h.remote.replace_count(), 0);

        h.link.send_replace(LinkState::Online);
        let receipt = h.persistence.sync(items.clone()).await.unwrap();

        assert!(!receipt.stale);
        assert_eq!(h.remote.document().videos, items);
    }

    #[tokio::test]
    async fn sync_while_offline_is_refused() {
        let h = harness(LinkState::Offline);

        let result = h.persistence.sync(seed()).await;

        assert!(matches!(result, Err(SyncError::Offline)));
    }

    #[tokio::test]
    async fn sync_surfaces_remote_failures() {
        let h = harness(LinkState::Online);
        h.remote.set_online(false);

        let result = h.persistence.sync(seed()).await;

        assert!(matches!(result, Err(SyncError::Remote { .. })));
    }

    #[tokio::test]
    async fn online_save_reports_the_remote_outcome() {
        let h = harness(LinkState::Online);
        let mut events = h.persistence.subscribe();

        let report = h.persistence.save(seed());

        assert!(report.remote_dispatched);
        let event = events.recv().await.unwrap();
        assert!(matches!(event, SyncEvent::RemoteSaved { seq, .. } if seq == report.seq));
        assert_eq!(h.remote.document().videos, seed());
    }

    #[tokio::test]
    async fn failed_remote_save_is_published() {
        let h = harness(LinkState::Online);
        h.remote.set_online(false);
        let mut events = h.persistence.subscribe();

        let report = h.persistence.save(seed());

        assert!(report.local_written);
        assert!(matches!(
            events.recv().await.unwrap(),
            SyncEvent::RemoteFailed { seq: 1, .. }
        ));
    }

    #[tokio::test]
    async fn failed_local_write_still_reaches_the_remote() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let remote = Arc::new(MemoryRemote::new(server_seed()));
        let (_link, rx) = watch::channel(LinkState::Online);
        let persistence = Persistence::new(LocalCache::new(&blocker), remote.clone(), rx);
        let mut events = persistence.subscribe();

        let report = persistence.save(seed());

        assert!(!report.local_written);
        assert!(report.remote_dispatched);
        assert!(matches!(
            events.recv().await.unwrap(),
            SyncEvent::LocalSaveFailed { seq: 1, .. }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            SyncEvent::RemoteSaved { seq: 1, .. }
        ));
        assert_eq!(remote.document().videos, seed());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_save_supersedes_the_one_in_flight() {
        let h = harness(LinkState::Online);
        let mut events = h.persistence.subscribe();

        h.remote.set_latency(Duration::from_secs(5));
        let first = h.persistence.save(with_item(seed(), "first"));
        tokio::task::yield_now().await;
        h.remote.set_latency(Duration::ZERO);
        let second = h.persistence.save(with_item(seed(), "second"));

        let outcomes = [events.recv().await.unwrap(), events.recv().await.unwrap()];
        assert!(outcomes.contains(&SyncEvent::RemoteSuperseded {
            seq: first.seq,
            by: second.seq
        }));
        assert!(outcomes
            .iter()
            .any(|event| matches!(event, SyncEvent::RemoteSaved { seq, .. } if *seq == second.seq)));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(h.remote.replace_count(), 1);
        assert_eq!(h.remote.document().videos.last().unwrap().name, "second");
    }

    #[tokio::test]
    async fn save_sequence_numbers_increase() {
        let h = harness(LinkState::Offline);

        let first = h.persistence.save(seed());
        let second = h.persistence.save(seed());

        assert!(second.seq > first.seq);
    }

    #[test]
    fn completing_out_of_order_is_stale() {
        let sequence = Sequence::default();
        let older = sequence.issue();
        let newer = sequence.issue();

        assert_eq!(sequence.complete(newer), Ok(()));
        assert_eq!(sequence.complete(older), Err(newer));
    }
}
