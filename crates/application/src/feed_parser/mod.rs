//! ICS feed parsing
//!
//! Turns the body of a subscribed feed into [`RawFeedEvent`] records.
//!
//! - `datetime`: `DTSTART`/`DTEND` value parsing
//! - `property`: classification of `KEY[;PARAM]:VALUE` content lines
//!
//! Malformed values and incomplete events are dropped with a log entry; a
//! broken `VEVENT` never aborts the rest of the feed. Folded continuation
//! lines and recurrence rules are not supported.

mod datetime;
mod property;

pub use datetime::parse_ics_datetime;
use domain::{FeedInstant, RawFeedEvent};
use property::FeedProperty;
use tracing::debug;

use crate::ports::TextSanitizer;

const BEGIN_EVENT: &str = "BEGIN:VEVENT";
const END_EVENT: &str = "END:VEVENT";

/// Properties collected for the `VEVENT` currently being read
#[derive(Debug, Default)]
struct PendingEvent {
    summary: Option<String>,
    start: Option<FeedInstant>,
    end: Option<FeedInstant>,
    description: Option<String>,
    location: Option<String>,
    uid: Option<String>,
    /// Depth of nested components such as `VALARM`; their properties are skipped
    nested: usize,
}

impl PendingEvent {
    fn apply(&mut self, property: FeedProperty) {
        match property {
            FeedProperty::Summary(summary) => self.summary = Some(summary),
            FeedProperty::DtStart(start) => self.start = start,
            FeedProperty::DtEnd(end) => self.end = end,
            FeedProperty::Description(text) => self.description = non_empty(text),
            FeedProperty::Location(text) => self.location = non_empty(text),
            FeedProperty::Uid(uid) => self.uid = Some(uid),
            FeedProperty::Unrecognized => {},
        }
    }

    fn finish(self) -> Option<RawFeedEvent> {
        let summary = self.summary.filter(|s| !s.trim().is_empty());
        let (Some(summary), Some(start)) = (summary, self.start) else {
            debug!(
                uid = self.uid.as_deref().unwrap_or_default(),
                "Dropping VEVENT without summary or valid start"
            );
            return None;
        };

        let mut event = RawFeedEvent::new(summary, start);
        event.end = self.end;
        event.description = self.description;
        event.location = self.location;
        event.uid = self.uid;
        Some(event)
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() { None } else { Some(text) }
}

/// Extract events from raw ICS text
///
/// Accepts `\n` and `\r\n` line endings. Events are returned in feed order;
/// the result may be empty. Summary, description and location are passed
/// through `sanitizer`; UIDs are kept verbatim.
pub fn parse_feed(raw: &str, sanitizer: &dyn TextSanitizer) -> Vec<RawFeedEvent> {
    let mut events = Vec::new();
    let mut pending: Option<PendingEvent> = None;

    for line in raw.lines().map(str::trim_end) {
        if line == BEGIN_EVENT {
            pending = Some(PendingEvent::default());
            continue;
        }

        let Some(current) = pending.as_mut() else {
            continue;
        };

        // Closes the event even when a nested component was left open
        if line == END_EVENT {
            if let Some(event) = pending.take().and_then(PendingEvent::finish) {
                events.push(event);
            }
            continue;
        }

        if line.is_empty() {
            continue;
        }

        if line.starts_with("BEGIN:") {
            current.nested += 1;
        } else if line.starts_with("END:") {
            current.nested = current.nested.saturating_sub(1);
        } else if current.nested == 0 {
            current.apply(FeedProperty::from_line(line, sanitizer));
        }
    }

    debug!(count = events.len(), "Parsed ICS feed");
    events
}
