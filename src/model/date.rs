use std::convert::Infallible;
use std::str::FromStr;

use chrono::NaiveDate;
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// A platform upload date as it appears on the wire.
///
/// `YYYY-MM-DD` is a real date and `""` is unset. Anything else is kept verbatim so
/// a record written by another client loads and is written back unchanged; it never
/// matches a date-based view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum UploadDate {
    #[default]
    Unset,
    On(NaiveDate),
    Unparsed(String),
}

impl UploadDate {
    pub fn get(&self) -> Option<NaiveDate> {
        match self {
            Self::On(date) => Some(*date),
            _ => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self, Self::Unparsed(_))
    }
}

impl FromStr for UploadDate {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let text = raw.trim();
        if text.is_empty() {
            return Ok(Self::Unset);
        }

        match text.parse::<NaiveDate>() {
            Ok(date) => Ok(Self::On(date)),
            Err(err) => {
                tracing::warn!(raw, error = %err, "upload date is not YYYY-MM-DD, keeping it as text");
                Ok(Self::Unparsed(raw.to_string()))
            }
        }
    }
}

impl std::fmt::Display for UploadDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unset => Ok(()),
            Self::On(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Unparsed(raw) => f.write_str(raw),
        }
    }
}

impl From<NaiveDate> for UploadDate {
    fn from(date: NaiveDate) -> Self {
        Self::On(date)
    }
}

impl From<Option<NaiveDate>> for UploadDate {
    fn from(date: Option<NaiveDate>) -> Self {
        date.map_or(Self::Unset, Self::On)
    }
}

impl From<&str> for UploadDate {
    fn from(raw: &str) -> Self {
        match raw.parse() {
            Ok(date) => date,
            Err(never) => match never {},
        }
    }
}
