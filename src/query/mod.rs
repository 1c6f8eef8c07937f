//! Read-only views over the collection.
//!
//! Everything in here is a pure function of the items handed in and, where dates
//! matter, of the `today` supplied by the caller. Nothing here mutates the store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use snafu::Snafu;

use crate::model::{ItemId, Platform, Progress, TrackedItem, UploadStatus};

pub use calendar::*;
pub use reminders::*;

mod calendar;
mod reminders;

/// The status filter currently applied to the item list. Exactly one is active at a time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    #[default]
    All,
    ShootPending,
    EditPending,
    UploadToday,
    Overdue,
    ScheduledUpcoming,
    IgUploaded,
    YtUploaded,
    NotUploaded,
}

impl Filter {
    pub fn name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::ShootPending => "shoot-pending",
            Self::EditPending => "edit-pending",
            Self::UploadToday => "upload-today",
            Self::Overdue => "overdue",
            Self::ScheduledUpcoming => "scheduled-upcoming",
            Self::IgUploaded => "ig-uploaded",
            Self::YtUploaded => "yt-uploaded",
            Self::NotUploaded => "not-uploaded",
        }
    }

    pub fn matches(self, item: &TrackedItem, today: NaiveDate) -> bool {
        let any_scheduled = |pred: fn(NaiveDate, NaiveDate) -> bool| {
            Platform::ALL
                .into_iter()
                .filter_map(|platform| item.scheduled_on(platform))
                .any(|date| pred(date, today))
        };

        match self {
            Self::All => true,
            Self::ShootPending => item.shoot == Progress::Pending,
            Self::EditPending => item.shoot == Progress::Done && item.edit == Progress::Pending,
            Self::UploadToday => any_scheduled(|date, today| date == today),
            Self::Overdue => any_scheduled(|date, today| date < today),
            Self::ScheduledUpcoming => any_scheduled(|date, today| date >= today),
            Self::IgUploaded => item.ig_upload == UploadStatus::Uploaded,
            Self::YtUploaded => item.yt_upload == UploadStatus::Uploaded,
            Self::NotUploaded => {
                item.ig_upload == UploadStatus::Not || item.yt_upload == UploadStatus::Not
            }
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(display("unknown filter `{name}`"))]
pub struct UnknownFilter {
    pub name: String,
}

impl std::str::FromStr for Filter {
    type Err = UnknownFilter;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let filter = match input {
            "all" | "" => Self::All,
            "shoot-pending" => Self::ShootPending,
            "edit-pending" => Self::EditPending,
            "upload-today" => Self::UploadToday,
            "overdue" | "Overdue" => Self::Overdue,
            "scheduled-upcoming" | "Scheduled" => Self::ScheduledUpcoming,
            "ig-uploaded" | "IGUploaded" => Self::IgUploaded,
            "yt-uploaded" | "YTUploaded" => Self::YtUploaded,
            "not-uploaded" => Self::NotUploaded,
            _ => {
                return Err(UnknownFilter {
                    name: input.to_string(),
                })
            }
        };

        Ok(filter)
    }
}

pub fn filter<'a>(
    filter: Filter, items: impl IntoIterator<Item = &'a TrackedItem>, today: NaiveDate,
) -> Vec<&'a TrackedItem> {
    items
        .into_iter()
        .filter(|item| filter.matches(item, today))
        .collect()
}

/// Case-insensitive substring match on name, content type and notes. An empty term
/// matches everything.
pub fn search<'a>(
    term: &str, items: impl IntoIterator<Item = &'a TrackedItem>,
) -> Vec<&'a TrackedItem> {
    let term = term.to_lowercase();

    items
        .into_iter()
        .filter(|item| {
            term.is_empty()
                || item.name.to_lowercase().contains(&term)
                || item.content_type.as_str().to_lowercase().contains(&term)
                || item.notes.to_lowercase().contains(&term)
        })
        .collect()
}

/// The list presentation shows: search narrows first, then the filter.
pub fn view<'a>(
    items: &'a [TrackedItem], term: &str, active: Filter, today: NaiveDate,
) -> Vec<&'a TrackedItem> {
    filter(active, search(term, items), today)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub edited: usize,
    pub ig_uploaded: usize,
    pub yt_uploaded: usize,
}

pub fn stats(items: &[TrackedItem]) -> Stats {
    let count = |pred: fn(&TrackedItem) -> bool| items.iter().filter(|item| pred(item)).count();

    Stats {
        total: items.len(),
        edited: count(|item| item.edit == Progress::Done),
        ig_uploaded: count(|item| item.ig_upload == UploadStatus::Uploaded),
        yt_uploaded: count(|item| item.yt_upload == UploadStatus::Uploaded),
    }
}

/// 1 for an empty collection, otherwise one past the largest id in use.
pub fn next_id(items: &[TrackedItem]) -> ItemId {
    items.iter().map(|item| item.id).max().map_or(1, |max| max + 1)
}

/// Likes per view as a percentage rounded to one decimal, `None` without views.
pub fn engagement_rate(item: &TrackedItem) -> Option<f64> {
    if item.views == 0 {
        return None;
    }

    let rate = item.likes as f64 / item.views as f64 * 100.0;
    Some((rate * 10.0).round() / 10.0)
}
