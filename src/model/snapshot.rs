use derive_new::new;
use serde::{Deserialize, Serialize};

use super::{now, Timestamp, TrackedItem};

/// Schema version written alongside every collection.
pub const VERSION: &str = "1.0.0";

pub fn default_version() -> String {
    VERSION.to_string()
}

/// What the local cache holds: the whole collection plus when it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct LocalRecord {
    #[serde(default)]
    pub videos: Vec<TrackedItem>,
    #[new(value = "default_version()")]
    #[serde(default = "default_version")]
    pub version: String,
    #[new(value = "Some(now())")]
    #[serde(default)]
    pub last_saved: Option<Timestamp>,
}

/// Body of `GET /api/videos`, also the document the remote authority keeps on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    #[serde(default)]
    pub videos: Vec<TrackedItem>,
    #[new(value = "default_version()")]
    #[serde(default = "default_version")]
    pub version: String,
    #[new(value = "Some(now())")]
    #[serde(default)]
    pub last_updated: Option<Timestamp>,
}

/// Body of `POST /api/videos`: replaces the whole remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct ReplaceRequest {
    pub videos: Vec<TrackedItem>,
    #[new(value = "default_version()")]
    #[serde(default = "default_version")]
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceResponse {
    pub success: bool,
    pub message: String,
    pub last_updated: Timestamp,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub timestamp: Timestamp,
}

impl Health {
    pub fn ok() -> Self {
        Self {
            status: "OK".to_string(),
            timestamp: now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportSource {
    Server,
    Local,
}

/// A downloadable copy of the collection. Import accepts the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub videos: Vec<TrackedItem>,
    #[new(value = "now()")]
    pub export_date: Timestamp,
    #[new(value = "default_version()")]
    pub version: String,
    pub source: ExportSource,
}

impl ExportBundle {
    /// Suggested file name, e.g. `reel-scheduler-backup-2025-01-19.json`.
    pub fn file_name(&self) -> String {
        format!(
            "reel-scheduler-backup-{}.json",
            self.export_date.date().format("%Y-%m-%d")
        )
    }
}
