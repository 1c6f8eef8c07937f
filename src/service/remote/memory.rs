use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt as _;
use snafu::ensure;

use super::{Remote, Result, UnreachableSnafu};
use crate::model::{now, Health, RemoteDocument, ReplaceRequest, ReplaceResponse, TrackedItem};

/// A remote authority living in memory, with a switch to take it off the network.
///
/// Useful wherever the engine needs a remote without a server behind it.
#[derive(Debug)]
pub struct MemoryRemote {
    document: Mutex<RemoteDocument>,
    online: AtomicBool,
    latency: Mutex<Duration>,
    replaced: AtomicUsize,
}

impl MemoryRemote {
    pub fn new(videos: Vec<TrackedItem>) -> Self {
        Self {
            document: Mutex::new(RemoteDocument::new(videos)),
            online: AtomicBool::new(true),
            latency: Mutex::new(Duration::ZERO),
            replaced: AtomicUsize::new(0),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Delay applied to every call made after this one.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap_or_else(PoisonError::into_inner) = latency;
    }

    pub fn document(&self) -> RemoteDocument {
        self.document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many replace requests have been applied.
    pub fn replace_count(&self) -> usize {
        self.replaced.load(Ordering::SeqCst)
    }

    fn latency(&self) -> Duration {
        *self.latency.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

impl Remote for MemoryRemote {
    fn fetch(&self) -> BoxFuture<'_, Result<RemoteDocument>> {
        let latency = self.latency();

        async move {
            tokio::time::sleep(latency).await;
            ensure!(self.is_online(), UnreachableSnafu);
            Ok(self.document())
        }
        .boxed()
    }

    fn replace(&self, request: ReplaceRequest) -> BoxFuture<'_, Result<ReplaceResponse>> {
        let latency = self.latency();

        async move {
            tokio::time::sleep(latency).await;
            ensure!(self.is_online(), UnreachableSnafu);

            let last_updated = now();
            *self.document.lock().unwrap_or_else(PoisonError::into_inner) = RemoteDocument {
                videos: request.videos,
                version: request.version,
                last_updated: Some(last_updated),
            };
            self.replaced.fetch_add(1, Ordering::SeqCst);

            Ok(ReplaceResponse {
                success: true,
                message: "Data saved successfully".to_string(),
                last_updated,
            })
        }
        .boxed()
    }

    fn health(&self) -> BoxFuture<'_, Result<Health>> {
        let latency = self.latency();

        async move {
            tokio::time::sleep(latency).await;
            ensure!(self.is_online(), UnreachableSnafu);
            Ok(Health::ok())
        }
        .boxed()
    }
}
