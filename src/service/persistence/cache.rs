use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use snafu::ResultExt as _;

use super::error::{CacheError, EncodeSnafu, ParseSnafu, ReadSnafu, WriteSnafu};
use crate::model::LocalRecord;

/// Storage slot the collection is kept under.
pub const CACHE_SLOT: &str = "reelSchedulerData";

/// The durable copy of the collection on this machine.
#[derive(Debug, Clone)]
pub struct LocalCache {
    path: PathBuf,
}

impl LocalCache {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{CACHE_SLOT}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when nothing has been cached yet.
    pub fn read(&self) -> Result<Option<LocalRecord>, CacheError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err).context(ReadSnafu { path: &self.path }),
        };

        serde_json::from_str(&text)
            .map(Some)
            .context(ParseSnafu { path: &self.path })
    }

    /// Replace the cached record. A crash mid-write leaves the previous record intact.
    pub fn write(&self, record: &LocalRecord) -> Result<(), CacheError> {
        let text = serde_json::to_string_pretty(record).context(EncodeSnafu)?;

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).context(WriteSnafu { path: dir })?;
        }

        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, text).context(WriteSnafu { path: &staging })?;
        std::fs::rename(&staging, &self.path).context(WriteSnafu { path: &self.path })?;

        Ok(())
    }
}
