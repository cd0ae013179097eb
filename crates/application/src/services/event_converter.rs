//! Event converter
//!
//! Maps parsed feed records onto the local schedule event shape.

use chrono::{DateTime, Duration, Local, TimeZone, Timelike};
use domain::{NewScheduleEvent, RawFeedEvent, SubscriptionId};
use tracing::warn;

/// Duration given to events whose end is missing or unusable
pub const DEFAULT_EVENT_DURATION: Duration = Duration::hours(1);

/// Converts [`RawFeedEvent`]s into [`NewScheduleEvent`] payloads
///
/// Day and times are rendered as local wall-clock values. Feed date-times
/// are UTC, so the calendar day of an event may differ from the one in the
/// feed.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventConverter;

impl EventConverter {
    /// Convert using the system's local time zone
    pub fn convert(raw: &RawFeedEvent, subscription_id: SubscriptionId) -> Option<NewScheduleEvent> {
        Self::convert_with_tz(raw, subscription_id, &Local)
    }

    /// Convert, rendering day and times in `tz`
    ///
    /// Returns `None` when the start cannot be represented in `tz`. An end
    /// that is missing or cannot be represented becomes start plus
    /// [`DEFAULT_EVENT_DURATION`].
    pub fn convert_with_tz<Tz: TimeZone>(
        raw: &RawFeedEvent,
        subscription_id: SubscriptionId,
        tz: &Tz,
    ) -> Option<NewScheduleEvent> {
        let Some(start) = raw.start.in_timezone(tz) else {
            warn!(
                component = "event_converter",
                summary = %raw.summary,
                start = %raw.start,
                "Skipping feed event with unrepresentable start"
            );
            return None;
        };

        let end = raw
            .end
            .and_then(|end| end.in_timezone(tz))
            .unwrap_or_else(|| start.clone() + DEFAULT_EVENT_DURATION);

        let mut event = NewScheduleEvent::external(
            subscription_id,
            raw.summary.clone(),
            start.date_naive(),
            wall_clock(&start),
            wall_clock(&end),
        );
        if let Some(uid) = &raw.uid {
            event = event.with_external_event_id(uid);
        }
        if let Some(description) = &raw.description {
            event = event.with_description(description);
        }
        if let Some(location) = &raw.location {
            event = event.with_location(location);
        }

        Some(event)
    }
}

/// Local time truncated to whole minutes
fn wall_clock<Tz: TimeZone>(instant: &DateTime<Tz>) -> chrono::NaiveTime {
    let time = instant.time();
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}
