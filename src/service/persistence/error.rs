use std::path::PathBuf;

use snafu::Snafu;

use crate::service::remote::RemoteError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CacheError {
    #[snafu(display("cannot read the local cache at {}: {source}", path.display()))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("cannot write the local cache at {}: {source}", path.display()))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("local cache at {} is corrupted: {source}", path.display()))]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[snafu(display("cannot encode the collection: {source}"))]
    Encode { source: serde_json::Error },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SyncError {
    #[snafu(display("cannot sync while offline"))]
    Offline,

    #[snafu(display("failed to sync with the remote: {source}"))]
    Remote { source: RemoteError },
}
