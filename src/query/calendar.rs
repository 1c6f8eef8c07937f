use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{Platform, TrackedItem, UploadStatus};

/// Number of characters of the video name shown on a calendar cell.
const LABEL_LENGTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventState {
    Scheduled,
    Uploaded,
}

impl EventState {
    pub fn class(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Uploaded => "uploaded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: u64,
    pub platform: Platform,
    pub label: String,
    pub title: String,
    pub state: EventState,
}

/// Shape of a month view: how many days it has and which weekday (0 = Sunday) the
/// first one falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthGrid {
    pub days: u32,
    pub first_weekday: u32,
}

pub fn month_grid(year: i32, month: u32) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = match month {
        12 => NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
        _ => NaiveDate::from_ymd_opt(year, month + 1, 1)?,
    };

    Some(MonthGrid {
        days: (next - first).num_days() as u32,
        first_weekday: first.weekday().num_days_from_sunday(),
    })
}

/// Uploads falling in `year`/`month`, keyed by day of month.
///
/// A platform contributes an event when its date is in the month and it is either
/// scheduled or uploaded. Items marked as not uploaded are left out even if a
/// stale date is still attached.
pub fn calendar_events(
    items: &[TrackedItem], year: i32, month: u32,
) -> BTreeMap<u32, Vec<CalendarEvent>> {
    let mut days: BTreeMap<u32, Vec<CalendarEvent>> = BTreeMap::new();

    for item in items {
        for platform in Platform::ALL {
            let status = item.upload(platform);
            let Some(date) = item.date(platform) else {
                continue;
            };

            if !status.is_dated() || date.year() != year || date.month() != month {
                continue;
            }

            let state = match status {
                UploadStatus::Uploaded => EventState::Uploaded,
                _ => EventState::Scheduled,
            };

            days.entry(date.day()).or_default().push(CalendarEvent {
                id: item.id,
                platform,
                label: truncate_label(&item.name),
                title: format!("{} - {} ({})", item.name, platform, status),
                state,
            });
        }
    }

    days
}

fn truncate_label(name: &str) -> String {
    if name.chars().count() <= LABEL_LENGTH {
        return name.to_string();
    }

    let head: String = name.chars().take(LABEL_LENGTH).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    #[test]
    fn events_include_uploaded_and_scheduled() {
        let mut uploaded = item(1, "Tauba Tauba");
        uploaded.ig_upload = UploadStatus::Uploaded;
        uploaded.ig_date = day("2025-01-19").into();
        let scheduled = scheduled(2, "APT", None, Some("2025-01-19"));

        let days = calendar_events(&[uploaded, scheduled], 2025, 1);
        let events = &days[&19];

        assert_eq!(days.len(), 1);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].state, EventState::Uploaded);
        assert_eq!(events[0].platform, Platform::Instagram);
        assert_eq!(events[0].title, "Tauba Tauba - Instagram (Uploaded)");
        assert_eq!(events[1].state.class(), "scheduled");
        assert_eq!(events[1].platform, Platform::YouTube);
    }

    #[test]
    fn not_uploaded_dates_are_ignored() {
        let mut stray = item(1, "stray");
        stray.ig_date = day("2025-01-05").into();

        assert!(calendar_events(&[stray], 2025, 1).is_empty());
    }

    #[test]
    fn other_months_are_excluded() {
        let items = [
            scheduled(1, "dec", Some("2024-12-31"), None),
            scheduled(2, "feb", Some("2025-02-01"), None),
            scheduled(3, "jan next year", Some("2026-01-10"), None),
        ];

        assert!(calendar_events(&items, 2025, 1).is_empty());
        assert!(calendar_events(&items, 2025, 13).is_empty());
    }

    #[test]
    fn labels_are_truncated_to_ten_characters() {
        let items = [scheduled(6, "Boyfriend-Karan Aujia", Some("2025-11-24"), None)];
        let days = calendar_events(&items, 2025, 11);

        assert_eq!(days[&24][0].label, "Boyfriend-...");
        assert_eq!(truncate_label("APT"), "APT");
        assert_eq!(truncate_label("0123456789"), "0123456789");
    }

    #[test]
    fn month_grid_handles_leap_years_and_december() {
        assert_eq!(
            month_grid(2024, 2),
            Some(MonthGrid {
                days: 29,
                first_weekday: 4
            })
        );
        assert_eq!(month_grid(2025, 12).map(|grid| grid.days), Some(31));
        assert_eq!(month_grid(2025, 0), None);
    }
}
