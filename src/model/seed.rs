use once_cell::sync::Lazy;

use super::{ContentType, Progress, TrackedItem, UploadDate, UploadStatus};

/// Bootstrap collection used when neither the remote authority nor the local cache
/// has anything to offer.
pub static SEED: Lazy<Vec<TrackedItem>> = Lazy::new(|| {
    vec![
        TrackedItem {
            views: 15000,
            likes: 1200,
            notes: "Good engagement, mostly female audience".to_string(),
            ..seed_item(1, "Tauba Tauba", ContentType::Dance, UploadStatus::Uploaded, "2024-08-07", UploadStatus::Not, "")
        },
        seed_item(2, "APT", ContentType::Dance, UploadStatus::Uploaded, "2025-01-19", UploadStatus::Not, ""),
        seed_item(6, "Boyfriend-Karan Aujia", ContentType::Music, UploadStatus::Uploaded, "2025-11-24", UploadStatus::Scheduled, "2026-01-18"),
        seed_item(8, "Lover-Dijlir Dosanjh", ContentType::Music, UploadStatus::Uploaded, "2025-12-07", UploadStatus::Scheduled, "2026-01-25"),
    ]
});

/// The smaller collection the remote authority starts from when its data file is missing.
pub fn server_seed() -> Vec<TrackedItem> {
    SEED.iter().take(2).cloned().collect()
}

pub fn seed() -> Vec<TrackedItem> {
    SEED.to_vec()
}

fn seed_item(
    id: u64, name: &str, content_type: ContentType, ig_upload: UploadStatus, ig_date: &str,
    yt_upload: UploadStatus, yt_date: &str,
) -> TrackedItem {
    TrackedItem {
        id,
        name: name.to_string(),
        content_type,
        shoot: Progress::Done,
        edit: Progress::Done,
        ig_upload,
        yt_upload,
        ig_date: date(ig_date),
        yt_date: date(yt_date),
        views: 0,
        likes: 0,
        notes: String::new(),
    }
}

fn date(text: &str) -> UploadDate {
    UploadDate::from(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_ids_are_unique() {
        let mut ids: Vec<u64> = SEED.iter().map(|item| item.id).collect();
        ids.dedup();
        assert_eq!(ids, vec![1, 2, 6, 8]);
    }

    #[test]
    fn server_seed_is_a_prefix() {
        let names: Vec<String> = server_seed().into_iter().map(|item| item.name).collect();
        assert_eq!(names, vec!["Tauba Tauba", "APT"]);
    }
}
