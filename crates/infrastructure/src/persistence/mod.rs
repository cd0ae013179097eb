//! Persistence module
//!
//! SQLite storage for calendar subscriptions and schedule events.

pub mod async_connection;
mod error;
pub mod schedule_event_store;
pub mod subscription_store;

pub use async_connection::{AsyncDatabase, AsyncDatabaseError};
pub use schedule_event_store::SqliteScheduleEventStore;
pub use subscription_store::SqliteSubscriptionStore;
