use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use super::{ContentType, Platform, Progress, UploadDate, UploadStatus};

pub type ItemId = u64;

/// One tracked video and its production/publishing metadata.
///
/// Field names follow the camelCase JSON shape shared with the remote authority and
/// the local cache. Upload dates are `YYYY-MM-DD` strings on the wire, with `""`
/// (or `null`) meaning "unset"; see [UploadDate].
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedItem {
    #[serde(default)]
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub shoot: Progress,
    #[serde(default)]
    pub edit: Progress,
    #[serde(default)]
    pub ig_upload: UploadStatus,
    #[serde(default)]
    pub yt_upload: UploadStatus,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub ig_date: UploadDate,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub yt_date: UploadDate,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub notes: String,
}

impl TrackedItem {
    pub fn from_draft(id: ItemId, draft: ItemDraft) -> Self {
        let mut item = Self {
            id,
            name: String::new(),
            content_type: ContentType::default(),
            shoot: Progress::default(),
            edit: Progress::default(),
            ig_upload: UploadStatus::default(),
            yt_upload: UploadStatus::default(),
            ig_date: UploadDate::Unset,
            yt_date: UploadDate::Unset,
            views: 0,
            likes: 0,
            notes: String::new(),
        };
        item.apply(draft);
        item
    }

    /// Overwrite every editable field with the draft, keeping the id.
    pub fn apply(&mut self, draft: ItemDraft) {
        let ItemDraft {
            name,
            content_type,
            shoot,
            edit,
            ig_upload,
            yt_upload,
            ig_date,
            yt_date,
            views,
            likes,
            notes,
        } = draft;

        self.name = name;
        self.content_type = content_type;
        self.shoot = shoot;
        self.edit = edit;
        self.ig_upload = ig_upload;
        self.yt_upload = yt_upload;
        self.ig_date = ig_date;
        self.yt_date = yt_date;
        self.views = views;
        self.likes = likes;
        self.notes = notes;
    }

    /// A copy under a new id with the publishing state and performance data reset.
    pub fn duplicate(&self, id: ItemId) -> Self {
        Self {
            id,
            name: format!("{} (Copy)", self.name),
            ig_upload: UploadStatus::Not,
            yt_upload: UploadStatus::Not,
            ig_date: UploadDate::Unset,
            yt_date: UploadDate::Unset,
            views: 0,
            likes: 0,
            notes: String::new(),
            ..self.clone()
        }
    }

    pub fn upload(&self, platform: Platform) -> &UploadStatus {
        match platform {
            Platform::Instagram => &self.ig_upload,
            Platform::YouTube => &self.yt_upload,
        }
    }

    pub fn date(&self, platform: Platform) -> Option<NaiveDate> {
        match platform {
            Platform::Instagram => self.ig_date.get(),
            Platform::YouTube => self.yt_date.get(),
        }
    }

    /// The date for `platform`, only if that platform is scheduled.
    pub fn scheduled_on(&self, platform: Platform) -> Option<NaiveDate> {
        match self.upload(platform) {
            UploadStatus::Scheduled => self.date(platform),
            _ => None,
        }
    }

    pub fn to_draft(&self) -> ItemDraft {
        ItemDraft {
            name: self.name.clone(),
            content_type: self.content_type.clone(),
            shoot: self.shoot.clone(),
            edit: self.edit.clone(),
            ig_upload: self.ig_upload.clone(),
            yt_upload: self.yt_upload.clone(),
            ig_date: self.ig_date.clone(),
            yt_date: self.yt_date.clone(),
            views: self.views,
            likes: self.likes,
            notes: self.notes.clone(),
        }
    }
}

/// The editable part of a [TrackedItem]: everything except the id.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemDraft {
    pub name: String,
    pub content_type: ContentType,
    pub shoot: Progress,
    pub edit: Progress,
    pub ig_upload: UploadStatus,
    pub yt_upload: UploadStatus,
    #[serde_as(as = "DefaultOnNull")]
    pub ig_date: UploadDate,
    #[serde_as(as = "DefaultOnNull")]
    pub yt_date: UploadDate,
    pub views: u64,
    pub likes: u64,
    pub notes: String,
}

impl ItemDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn date(text: &str) -> UploadDate {
        UploadDate::from(text)
    }

    #[test]
    fn missing_fields_take_defaults() {
        let item: TrackedItem = serde_json::from_value(json!({ "id": 3, "name": "APT" })).unwrap();

        assert_eq!(item.content_type, ContentType::Other);
        assert_eq!(item.shoot, Progress::Pending);
        assert_eq!(item.yt_upload, UploadStatus::Not);
        assert_eq!(item.ig_date, UploadDate::Unset);
        assert_eq!(item.views, 0);
    }

    #[test]
    fn empty_date_means_unset_and_is_written_back_empty() {
        let item: TrackedItem = serde_json::from_value(json!({
            "id": 1,
            "name": "Tauba Tauba",
            "igUpload": "Uploaded",
            "igDate": "2024-08-07",
            "ytDate": ""
        }))
        .unwrap();

        assert_eq!(item.ig_date, date("2024-08-07"));
        assert_eq!(item.yt_date, UploadDate::Unset);

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["ytDate"], "");
        assert_eq!(value["igDate"], "2024-08-07");
        assert_eq!(value["contentType"], "Other");
    }

    #[test]
    fn null_and_foreign_dates_do_not_fail_the_item() {
        let item: TrackedItem = serde_json::from_value(json!({
            "id": 7,
            "name": "Mirror cut",
            "igUpload": "Scheduled",
            "igDate": "05/01/2025",
            "ytDate": null
        }))
        .unwrap();

        assert_eq!(item.ig_date, UploadDate::Unparsed("05/01/2025".to_string()));
        assert_eq!(item.scheduled_on(Platform::Instagram), None);
        assert_eq!(item.yt_date, UploadDate::Unset);

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["igDate"], "05/01/2025");
        assert_eq!(value["ytDate"], "");
    }

    #[test]
    fn duplicate_resets_publishing_state() {
        let mut original = TrackedItem::from_draft(4, ItemDraft::named("Lover"));
        original.content_type = ContentType::Music;
        original.shoot = Progress::Done;
        original.ig_upload = UploadStatus::Uploaded;
        original.yt_upload = UploadStatus::Scheduled;
        original.ig_date = date("2025-12-07");
        original.yt_date = date("2026-01-25");
        original.views = 900;
        original.likes = 80;
        original.notes = "trending audio".to_string();

        let copy = original.duplicate(9);

        assert_eq!(copy.id, 9);
        assert_eq!(copy.name, "Lover (Copy)");
        assert_eq!(copy.content_type, ContentType::Music);
        assert_eq!(copy.shoot, Progress::Done);
        assert_eq!(copy.ig_upload, UploadStatus::Not);
        assert_eq!(copy.yt_upload, UploadStatus::Not);
        assert!(copy.ig_date.is_unset() && copy.yt_date.is_unset());
        assert_eq!((copy.views, copy.likes), (0, 0));
        assert!(copy.notes.is_empty());
    }

    #[test]
    fn apply_keeps_the_id() {
        let mut item = TrackedItem::from_draft(7, ItemDraft::named("Old"));
        let mut draft = item.to_draft();
        draft.name = "New".to_string();
        draft.views = 42;

        item.apply(draft);

        assert_eq!(item.id, 7);
        assert_eq!(item.name, "New");
        assert_eq!(item.views, 42);
    }
}
