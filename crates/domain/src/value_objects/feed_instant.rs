//! Instants parsed from ICS `DTSTART`/`DTEND` values

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A point in time taken from an ICS feed
///
/// All-day values (`YYYYMMDD`) carry no time of day and are anchored at
/// local midnight when rendered. Date-time values (`YYYYMMDDTHHMMSS[Z]`)
/// are always read as UTC, regardless of a `TZID` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FeedInstant {
    /// Date-only value, midnight in the renderer's local time zone
    Date(NaiveDate),
    /// Date-time value in UTC
    DateTime(DateTime<Utc>),
}

impl FeedInstant {
    /// Whether this instant came from an all-day value
    #[must_use]
    pub const fn is_all_day(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// Render this instant in the given time zone
    ///
    /// Returns `None` when an all-day value falls into a gap of the zone
    /// (local midnight skipped by a DST transition).
    pub fn in_timezone<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        match self {
            Self::Date(date) => tz
                .from_local_datetime(&date.and_time(NaiveTime::MIN))
                .earliest(),
            Self::DateTime(instant) => Some(instant.with_timezone(tz)),
        }
    }
}

impl fmt::Display for FeedInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::DateTime(instant) => write!(f, "{}", instant.to_rfc3339()),
        }
    }
}
