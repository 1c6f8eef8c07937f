use chrono::{Duration, NaiveDate, SecondsFormat};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, Sub};

pub fn now() -> Timestamp {
    Timestamp(chrono::Utc::now())
}

/// Today's calendar date on the caller's clock.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, new)]
pub struct Timestamp(chrono::DateTime<chrono::Utc>);

impl Timestamp {
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }
}

impl Deref for Timestamp {
    type Target = chrono::DateTime<chrono::Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<chrono::DateTime<chrono::Utc>> for Timestamp {
    fn from(value: chrono::DateTime<chrono::Utc>) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        chrono::DateTime::parse_from_rfc3339(&s)
            .map(|dt| Self(dt.into()))
            .map_err(serde::de::Error::custom)
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        self.0 - rhs.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_like_javascript_iso_strings() {
        let timestamp: Timestamp = serde_json::from_str("\"2025-01-19T08:30:00.000Z\"").unwrap();
        assert_eq!(
            serde_json::to_string(&timestamp).unwrap(),
            "\"2025-01-19T08:30:00.000Z\""
        );
        assert_eq!(timestamp.date(), NaiveDate::from_ymd_opt(2025, 1, 19).unwrap());
    }

    #[test]
    fn accepts_offsets_and_normalizes_to_utc() {
        let timestamp: Timestamp =
            serde_json::from_str("\"2025-01-19T05:30:00+05:30\"").unwrap();
        assert_eq!(timestamp.to_string(), "2025-01-19T00:00:00.000Z");
    }
}
