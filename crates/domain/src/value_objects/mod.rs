//! Value Objects - Immutable, identity-less domain primitives

mod feed_instant;
mod schedule_event_id;
mod subscription_id;

pub use feed_instant::FeedInstant;
pub use schedule_event_id::ScheduleEventId;
pub use subscription_id::SubscriptionId;
