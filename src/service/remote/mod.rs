//! Client side of the remote authority's REST contract.

use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt as _;
use snafu::{ensure, ResultExt as _};
use url::Url;

use crate::model::{Health, RemoteDocument, ReplaceRequest, ReplaceResponse};

pub use error::*;
pub use memory::*;

mod error;
mod memory;

/// The networked store treated as the source of truth whenever it can be reached.
///
/// Every write replaces the whole collection; there is no per-item endpoint.
pub trait Remote: Send + Sync + 'static {
    /// `GET /api/videos`
    fn fetch(&self) -> BoxFuture<'_, Result<RemoteDocument>>;

    /// `POST /api/videos`
    fn replace(&self, request: ReplaceRequest) -> BoxFuture<'_, Result<ReplaceResponse>>;

    /// `GET /api/health`
    fn health(&self) -> BoxFuture<'_, Result<Health>>;
}

#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    videos: Url,
    health: Url,
    timeout: Duration,
}

impl HttpRemote {
    /// `base` is the server root, e.g. `http://localhost:3000/`. Every request is
    /// bounded by `timeout`.
    pub fn new(base: &str, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base).context(BaseUrlSnafu { url: base })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let endpoint = |path: &str| {
            base.join(path).context(EndpointSnafu {
                base: base.clone(),
                path,
            })
        };

        let videos = endpoint("api/videos")?;
        let health = endpoint("api/health")?;
        let client = reqwest::Client::builder().build().context(ClientSnafu)?;

        Ok(Self {
            client,
            videos,
            health,
            timeout,
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .context(TransportSnafu)?;

        let status = response.status();
        ensure!(status.is_success(), StatusSnafu { status });

        response.json().await.context(DecodeSnafu)
    }
}

impl Remote for HttpRemote {
    fn fetch(&self) -> BoxFuture<'_, Result<RemoteDocument>> {
        async move {
            tracing::debug!(url = %self.videos, "fetching the collection from the remote");
            self.get(&self.videos).await
        }
        .boxed()
    }

    fn replace(&self, request: ReplaceRequest) -> BoxFuture<'_, Result<ReplaceResponse>> {
        async move {
            tracing::debug!(
                url = %self.videos,
                count = request.videos.len(),
                "replacing the remote collection"
            );
            let response = self
                .client
                .post(self.videos.clone())
                .timeout(self.timeout)
                .json(&request)
                .send()
                .await
                .context(TransportSnafu)?;

            let status = response.status();
            ensure!(status.is_success(), StatusSnafu { status });

            response.json().await.context(DecodeSnafu)
        }
        .boxed()
    }

    fn health(&self) -> BoxFuture<'_, Result<Health>> {
        self.get(&self.health).boxed()
    }
}
