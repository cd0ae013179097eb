//! Schedule event storage port
//!
//! Read and delete access to the local event store. New events only enter
//! the store through [`EventCreationPort`](super::EventCreationPort).

use async_trait::async_trait;
use domain::{ScheduleEvent, ScheduleEventId, SubscriptionId};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for schedule event persistence operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ScheduleEventStore: Send + Sync {
    /// List every stored event
    async fn list_all(&self) -> Result<Vec<ScheduleEvent>, ApplicationError>;

    /// List the external events produced by a subscription
    async fn list_for_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Vec<ScheduleEvent>, ApplicationError>;

    /// Delete a single event
    ///
    /// # Returns
    /// `true` if a record was removed
    async fn delete(&self, id: &ScheduleEventId) -> Result<bool, ApplicationError>;

    /// Delete every external event whose `external_calendar_id` matches
    ///
    /// Runs as one transaction; must complete before new events for the same
    /// subscription are created.
    ///
    /// # Returns
    /// Number of deleted events
    async fn delete_by_external_calendar(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<u64, ApplicationError>;
}
