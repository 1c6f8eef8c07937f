use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{Platform, TrackedItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub video: String,
    pub platform: Platform,
    pub date: NaiveDate,
}

/// Scheduled uploads grouped by how urgent they are.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminders {
    pub today: Vec<Reminder>,
    pub tomorrow: Vec<Reminder>,
    pub overdue: Vec<Reminder>,
}

impl Reminders {
    pub fn is_empty(&self) -> bool {
        self.today.is_empty() && self.tomorrow.is_empty() && self.overdue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.today.len() + self.tomorrow.len() + self.overdue.len()
    }
}

/// Each platform is classified on its own, so one video can land in two buckets.
/// Only scheduled uploads with a date count; dates further out than tomorrow are
/// not reminded about.
pub fn reminders(items: &[TrackedItem], today: NaiveDate) -> Reminders {
    let tomorrow = today.succ_opt();
    let mut reminders = Reminders::default();

    for item in items {
        for platform in Platform::ALL {
            let Some(date) = item.scheduled_on(platform) else {
                continue;
            };

            let bucket = if date == today {
                &mut reminders.today
            } else if Some(date) == tomorrow {
                &mut reminders.tomorrow
            } else if date < today {
                &mut reminders.overdue
            } else {
                continue;
            };

            bucket.push(Reminder {
                video: item.name.clone(),
                platform,
                date,
            });
        }
    }

    reminders
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::model::UploadStatus;

    const TODAY: &str = "2025-06-10";

    fn buckets(item: TrackedItem) -> (usize, usize, usize) {
        let reminders = reminders(&[item], day(TODAY));
        (
            reminders.today.len(),
            reminders.tomorrow.len(),
            reminders.overdue.len(),
        )
    }

    #[test]
    fn classifies_on_date_boundaries() {
        assert_eq!(buckets(scheduled(1, "a", Some("2025-06-10"), None)), (1, 0, 0));
        assert_eq!(buckets(scheduled(1, "a", Some("2025-06-11"), None)), (0, 1, 0));
        assert_eq!(buckets(scheduled(1, "a", Some("2025-06-09"), None)), (0, 0, 1));
        assert_eq!(buckets(scheduled(1, "a", Some("2025-06-12"), None)), (0, 0, 0));
    }

    #[test]
    fn uploaded_items_are_never_reminded() {
        let mut item = scheduled(1, "a", Some(TODAY), None);
        item.ig_upload = UploadStatus::Uploaded;

        assert_eq!(buckets(item), (0, 0, 0));
    }

    #[test]
    fn platforms_are_classified_independently() {
        let item = scheduled(1, "Lover", Some("2025-06-10"), Some("2025-06-01"));
        let reminders = reminders(&[item], day(TODAY));

        assert_eq!(
            reminders.today,
            vec![Reminder {
                video: "Lover".to_string(),
                platform: Platform::Instagram,
                date: day("2025-06-10"),
            }]
        );
        assert_eq!(reminders.overdue[0].platform, Platform::YouTube);
        assert_eq!(reminders.len(), 2);
    }

    #[test]
    fn tomorrow_rolls_over_month_end() {
        let item = scheduled(1, "a", None, Some("2025-07-01"));
        let reminders = reminders(&[item], day("2025-06-30"));

        assert_eq!(reminders.tomorrow.len(), 1);
    }
}
