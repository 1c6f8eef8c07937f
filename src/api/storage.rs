use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use snafu::{ResultExt as _, Snafu};
use tokio::sync::Mutex;

use crate::model::{now, server_seed, RemoteDocument, Timestamp, TrackedItem};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StorageError {
    #[snafu(display("cannot read {}: {source}", path.display()))]
    ReadDocument {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("cannot write {}: {source}", path.display()))]
    WriteDocument {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("{} does not hold a video document: {source}", path.display()))]
    ParseDocument {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[snafu(display("cannot encode the video document: {source}"))]
    EncodeDocument { source: serde_json::Error },
}

/// The remote authority's copy of the collection: one JSON document on disk,
/// replaced wholesale on every write.
#[derive(Debug)]
pub struct DocumentStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl DocumentStore {
    /// Open the document at `path`, creating it with the sample videos when missing.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        };

        match tokio::fs::metadata(&store.path).await {
            Ok(_) => tracing::info!(path = %store.path.display(), "data file exists"),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                store.write(&RemoteDocument::new(server_seed())).await?;
                tracing::info!(path = %store.path.display(), "created new data file with sample data");
            }
            Err(err) => return Err(err).context(ReadDocumentSnafu { path: &store.path }),
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> Result<RemoteDocument, StorageError> {
        let _guard = self.lock.lock().await;
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .context(ReadDocumentSnafu { path: &self.path })?;

        serde_json::from_str(&text).context(ParseDocumentSnafu { path: &self.path })
    }

    /// Swap in a new collection and return when it was written.
    pub async fn replace(
        &self, videos: Vec<TrackedItem>, version: String,
    ) -> Result<Timestamp, StorageError> {
        let last_updated = now();
        let document = RemoteDocument {
            videos,
            version,
            last_updated: Some(last_updated),
        };

        self.write(&document).await?;
        Ok(last_updated)
    }

    /// Write to a staging file next to the document, then rename it over the
    /// document so readers never see a half-written file.
    async fn write(&self, document: &RemoteDocument) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let text = serde_json::to_string_pretty(document).context(EncodeDocumentSnafu)?;

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .context(WriteDocumentSnafu { path: dir })?;
        }

        let staging = self.staging_path();
        tokio::fs::write(&staging, text)
            .await
            .context(WriteDocumentSnafu { path: &staging })?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .context(WriteDocumentSnafu { path: &self.path })
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
