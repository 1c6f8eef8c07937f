use serde::{Deserialize, Serialize};

crate::labelled_enum! {
    /// Category of a video.
    ContentType (default Other) {
        Dance => "Dance",
        Vlog => "Vlog",
        Bts => "BTS",
        Motivation => "Motivation",
        BrandCollab => "Brand Collab",
        Tutorial => "Tutorial",
        Music => "Music",
        Other => "Other",
    }
}

crate::labelled_enum! {
    /// Progress of a production step (shoot or edit).
    Progress (default Pending) {
        Done => "Done",
        Pending => "Pending",
    }
}

crate::labelled_enum! {
    /// Publishing state of a video on one platform.
    UploadStatus (default Not) {
        Not => "Not",
        Scheduled => "Scheduled",
        Uploaded => "Uploaded",
    }
}

impl Progress {
    /// Style class used by presentation, `None` for values we don't recognize.
    pub fn style_class(&self) -> Option<&'static str> {
        match self {
            Self::Done => Some("status-done"),
            Self::Pending => Some("status-pending"),
            Self::Unknown(_) => None,
        }
    }
}

impl UploadStatus {
    pub fn style_class(&self) -> Option<&'static str> {
        match self {
            Self::Uploaded => Some("status-done"),
            Self::Scheduled => Some("status-scheduled"),
            Self::Not => Some("status-not"),
            Self::Unknown(_) => None,
        }
    }

    /// Whether a date attached to this status means anything.
    pub fn is_dated(&self) -> bool {
        matches!(self, Self::Scheduled | Self::Uploaded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    Instagram,
    YouTube,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Instagram, Platform::YouTube];

    pub fn label(self) -> &'static str {
        match self {
            Self::Instagram => "Instagram",
            Self::YouTube => "YouTube",
        }
    }

    /// Short class name used for calendar events.
    pub fn short(self) -> &'static str {
        match self {
            Self::Instagram => "ig",
            Self::YouTube => "yt",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
