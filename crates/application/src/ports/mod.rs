//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod event_creation_port;
mod feed_fetcher_port;
mod schedule_event_store;
mod subscription_store;
mod text_sanitizer;

pub use event_creation_port::EventCreationPort;
#[cfg(test)]
pub use event_creation_port::MockEventCreationPort;
pub use feed_fetcher_port::FeedFetcherPort;
#[cfg(test)]
pub use feed_fetcher_port::MockFeedFetcherPort;
pub use schedule_event_store::ScheduleEventStore;
#[cfg(test)]
pub use schedule_event_store::MockScheduleEventStore;
pub use subscription_store::SubscriptionStore;
#[cfg(test)]
pub use subscription_store::MockSubscriptionStore;
#[cfg(test)]
pub use text_sanitizer::MockTextSanitizer;
pub use text_sanitizer::TextSanitizer;
