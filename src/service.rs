//! The sync engine as one explicitly constructed object.
//!
//! [`ReelService`] owns the item store, the link monitor, the persistence
//! coordinator and the autosave timer. Every mutation goes through the store and then
//! through the save path; queries only ever read a snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use snafu::OptionExt as _;
use tokio::sync::{broadcast, watch, RwLock};
use tracing::instrument;

use crate::config::{Config, Timings};
use crate::model::{today, ExportBundle, ExportSource, ItemDraft, ItemId, TrackedItem};
use crate::query::{self, CalendarEvent, Filter, Reminders, Stats};

pub use autosave::*;
pub use monitor::*;
pub use persistence::*;
pub use remote::*;
pub use store::*;
pub use task::Task;

use store::NotFoundSnafu;

mod autosave;
mod monitor;
mod persistence;
mod remote;
mod store;
mod task;

#[derive(Debug)]
struct Core {
    store: RwLock<ItemStore>,
    persistence: Persistence,
}

impl Core {
    async fn save(&self) -> SaveReport {
        let items = self.store.read().await.snapshot();
        self.persistence.save(items)
    }
}

impl SaveTarget for Core {
    async fn autosave(&self) {
        let report = self.save().await;
        tracing::debug!(seq = report.seq, "autosaved");
    }
}

#[derive(Debug)]
pub struct ReelService {
    core: Arc<Core>,
    monitor: ConnectionMonitor,
    autosave: Autosave<Core>,
    monitor_interval: Duration,
}

impl ReelService {
    /// A service talking HTTP to `config.remote_url` and caching under `config.cache_dir`.
    pub fn new(config: &Config) -> Result<Self, RemoteError> {
        let remote = HttpRemote::new(&config.remote_url, config.timings.request_timeout)?;
        let cache = LocalCache::new(&config.cache_dir);

        Ok(Self::from_parts(Arc::new(remote), cache, config.timings))
    }

    pub fn from_parts(remote: Arc<dyn Remote>, cache: LocalCache, timings: Timings) -> Self {
        let monitor = ConnectionMonitor::new(remote.clone(), timings.probe_timeout);
        let persistence = Persistence::new(cache, remote, monitor.watch());

        let core = Arc::new(Core {
            store: RwLock::new(ItemStore::default()),
            persistence,
        });
        let autosave = Autosave::new(core.clone(), timings.autosave_delay);

        Self {
            core,
            monitor,
            autosave,
            monitor_interval: timings.monitor_interval,
        }
    }

    /// Probe the link once, then load the collection.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Loaded {
        let state = self.monitor.check().await;
        tracing::info!(%state, "starting");
        self.load().await
    }

    /// Replace the store with whatever the best available source holds.
    pub async fn load(&self) -> Loaded {
        let loaded = self.core.persistence.load().await;
        self.core.store.write().await.replace(loaded.items.clone());
        loaded
    }

    pub async fn items(&self) -> Vec<TrackedItem> {
        self.core.store.read().await.snapshot()
    }

    pub async fn get(&self, id: ItemId) -> Option<TrackedItem> {
        self.core.store.read().await.get(id).cloned()
    }

    pub async fn add(&self, draft: ItemDraft) -> Result<TrackedItem, StoreError> {
        let item = self.core.store.write().await.add(draft)?.clone();
        self.save().await;
        Ok(item)
    }

    pub async fn update(&self, id: ItemId, draft: ItemDraft) -> Result<TrackedItem, StoreError> {
        let item = self.core.store.write().await.update(id, draft)?.clone();
        self.save().await;
        Ok(item)
    }

    /// Edit one item in place and let the autosave timer pick it up.
    pub async fn amend(
        &self, id: ItemId, edit: impl FnOnce(&mut ItemDraft),
    ) -> Result<TrackedItem, StoreError> {
        let item = {
            let mut store = self.core.store.write().await;
            let mut draft = store.get(id).context(NotFoundSnafu { id })?.to_draft();
            edit(&mut draft);
            store.update(id, draft)?.clone()
        };

        self.notify_mutation();
        Ok(item)
    }

    pub async fn delete(&self, id: ItemId) -> Option<TrackedItem> {
        let removed = self.core.store.write().await.delete(id)?;
        self.save().await;
        Some(removed)
    }

    pub async fn duplicate(&self, id: ItemId) -> Result<TrackedItem, StoreError> {
        let copy = self.core.store.write().await.duplicate(id)?.clone();
        self.save().await;
        Ok(copy)
    }

    #[instrument(skip(self))]
    pub async fn clear(&self) {
        self.core.store.write().await.clear();
        tracing::info!("cleared all videos");
        self.save().await;
    }

    /// Replace the collection with an export file's contents. Nothing changes on error.
    #[instrument(skip_all)]
    pub async fn import(&self, text: &str) -> Result<usize, ImportError> {
        let count = self.core.store.write().await.import(text)?;
        tracing::info!(count, "imported videos");
        self.save().await;
        Ok(count)
    }

    pub async fn export(&self) -> ExportBundle {
        let source = match self.link_state() {
            LinkState::Online => ExportSource::Server,
            LinkState::Offline => ExportSource::Local,
        };

        self.core.store.read().await.export(source)
    }

    pub async fn save(&self) -> SaveReport {
        self.autosave.cancel();
        self.core.save().await
    }

    /// Push the whole collection to the remote and wait for it.
    pub async fn sync(&self) -> Result<SyncReceipt, SyncError> {
        let items = self.items().await;
        self.core.persistence.sync(items).await
    }

    pub fn notify_mutation(&self) {
        self.autosave.notify_mutation();
    }

    pub async fn view(&self, term: &str, filter: Filter) -> Vec<TrackedItem> {
        let store = self.core.store.read().await;
        query::view(store.items(), term, filter, today())
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn stats(&self) -> Stats {
        query::stats(self.core.store.read().await.items())
    }

    pub async fn reminders(&self) -> Reminders {
        query::reminders(self.core.store.read().await.items(), today())
    }

    pub async fn calendar(&self, year: i32, month: u32) -> BTreeMap<u32, Vec<CalendarEvent>> {
        query::calendar_events(self.core.store.read().await.items(), year, month)
    }

    pub fn link_state(&self) -> LinkState {
        self.monitor.state()
    }

    pub async fn check_connection(&self) -> LinkState {
        self.monitor.check().await
    }

    pub fn subscribe_link(&self) -> broadcast::Receiver<Transition> {
        self.monitor.subscribe()
    }

    pub fn watch_link(&self) -> watch::Receiver<LinkState> {
        self.monitor.watch()
    }

    pub fn subscribe_sync(&self) -> broadcast::Receiver<SyncEvent> {
        self.core.persistence.subscribe()
    }

    /// Probe the link on the configured interval until the task is stopped.
    pub fn start_monitoring(&self) -> Task {
        self.monitor.start_monitoring(self.monitor_interval)
    }
}
