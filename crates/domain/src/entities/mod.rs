//! Domain entities - Objects with identity and lifecycle

mod calendar_subscription;
mod raw_feed_event;
mod schedule_event;

pub use calendar_subscription::{CalendarSubscription, DEFAULT_SUBSCRIPTION_COLOR, SyncStatus};
pub use raw_feed_event::RawFeedEvent;
pub use schedule_event::{EventType, NewScheduleEvent, ScheduleEvent, hh_mm};
