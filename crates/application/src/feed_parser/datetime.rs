//! ICS date and date-time value parsing
//!
//! Accepts the two `DTSTART`/`DTEND` shapes found in subscribed feeds:
//! - `YYYYMMDD` (all-day)
//! - `YYYYMMDDTHHMMSS[Z]` (always read as UTC)
//!
//! `TZID` parameters are stripped before values reach this module and a
//! trailing `Z` is ignored, so every date-time is treated as UTC.

use chrono::{NaiveDate, TimeZone, Utc};
use domain::FeedInstant;
use thiserror::Error;
use tracing::warn;

const YEAR_RANGE: std::ops::RangeInclusive<u32> = 1900..=2100;
const MONTH_RANGE: std::ops::RangeInclusive<u32> = 1..=12;
const DAY_RANGE: std::ops::RangeInclusive<u32> = 1..=31;

/// Why a value was rejected
#[derive(Debug, Error, PartialEq, Eq)]
enum Rejection {
    #[error("empty value")]
    Empty,

    #[error("expected YYYYMMDD or YYYYMMDDTHHMMSS[Z]")]
    Shape,

    #[error("{0} is not a number")]
    NotNumeric(&'static str),

    #[error("{field} {value} is out of range")]
    OutOfRange { field: &'static str, value: u32 },

    #[error("date does not exist")]
    NoSuchDate,
}

/// Parse an ICS property value into a [`FeedInstant`]
///
/// Returns `None` and logs a warning when the value is empty, malformed or
/// out of range. Never panics.
pub fn parse_ics_datetime(value: &str) -> Option<FeedInstant> {
    match parse(value.trim()) {
        Ok(instant) => Some(instant),
        Err(reason) => {
            warn!(component = "ics_datetime", value, %reason, "Rejected ICS date/time value");
            None
        },
    }
}

fn parse(value: &str) -> Result<FeedInstant, Rejection> {
    if value.is_empty() {
        return Err(Rejection::Empty);
    }
    if !value.is_ascii() {
        return Err(Rejection::Shape);
    }

    if value.len() == 8 {
        return parse_date(value).map(FeedInstant::Date);
    }

    if let Some((date, time)) = value.split_once('T') {
        return parse_date_time(date, time);
    }

    Err(Rejection::Shape)
}

fn parse_date(digits: &str) -> Result<NaiveDate, Rejection> {
    if digits.len() != 8 {
        return Err(Rejection::Shape);
    }

    let year = number("year", &digits[0..4])?;
    let month = number("month", &digits[4..6])?;
    let day = number("day", &digits[6..8])?;

    in_range("year", year, &YEAR_RANGE)?;
    in_range("month", month, &MONTH_RANGE)?;
    in_range("day", day, &DAY_RANGE)?;

    #[allow(clippy::cast_possible_wrap)]
    NaiveDate::from_ymd_opt(year as i32, month, day).ok_or(Rejection::NoSuchDate)
}

fn parse_date_time(date: &str, time: &str) -> Result<FeedInstant, Rejection> {
    let date = parse_date(date)?;

    let time = time.strip_suffix('Z').unwrap_or(time);
    if time.len() < 6 {
        return Err(Rejection::Shape);
    }

    let hour = number("hour", &time[0..2])?;
    let minute = number("minute", &time[2..4])?;
    let second = number("second", &time[4..6])?;

    in_range("hour", hour, &(0..=23))?;
    in_range("minute", minute, &(0..=59))?;
    in_range("second", second, &(0..=59))?;

    let naive = date
        .and_hms_opt(hour, minute, second)
        .ok_or(Rejection::NoSuchDate)?;

    Ok(FeedInstant::DateTime(Utc.from_utc_datetime(&naive)))
}

fn number(field: &'static str, digits: &str) -> Result<u32, Rejection> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Rejection::NotNumeric(field));
    }
    digits.parse().map_err(|_| Rejection::NotNumeric(field))
}

fn in_range(
    field: &'static str,
    value: u32,
    range: &std::ops::RangeInclusive<u32>,
) -> Result<(), Rejection> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Rejection::OutOfRange { field, value })
    }
}
